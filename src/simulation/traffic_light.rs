//! Traffic light controller for the intersection
//!
//! Two steady phases (one per axis) plus a clearance buffer that follows
//! every accepted switch. The colour shown to each axis is derived from that
//! state and is not stored separately.

use log::debug;

use super::types::{Axis, SignalColor};

/// Read-only view of the controller used by policies and renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightObservation {
    pub active_axis: Axis,
    pub transition_remaining_ms: u32,
}

/// The traffic light at the centre of the intersection
#[derive(Debug, Clone)]
pub struct SimTrafficLight {
    active_axis: Axis,
    /// Countdown of the clearance buffer, zero when in a steady phase
    transition_remaining_ms: u32,
    /// Length of the buffer started by each accepted switch
    buffer_ms: u32,
    /// Number of accepted switch requests
    switches: u32,
}

impl SimTrafficLight {
    pub fn new(active_axis: Axis, buffer_ms: u32) -> Self {
        Self {
            active_axis,
            transition_remaining_ms: 0,
            buffer_ms,
            switches: 0,
        }
    }

    /// Flip the active axis and start the clearance buffer.
    /// Ignored while a buffer is already running.
    /// Returns true if the request was accepted.
    pub fn request_switch(&mut self) -> bool {
        if self.transition_remaining_ms > 0 {
            return false;
        }
        self.active_axis = self.active_axis.other();
        self.transition_remaining_ms = self.buffer_ms;
        self.switches += 1;
        debug!(
            "Light switched to {:?}, buffer {} ms",
            self.active_axis, self.buffer_ms
        );
        true
    }

    /// Run the buffer countdown, floored at zero
    pub fn advance(&mut self, delta_ms: u32) {
        self.transition_remaining_ms = self.transition_remaining_ms.saturating_sub(delta_ms);
    }

    pub fn observe(&self) -> LightObservation {
        LightObservation {
            active_axis: self.active_axis,
            transition_remaining_ms: self.transition_remaining_ms,
        }
    }

    pub fn active_axis(&self) -> Axis {
        self.active_axis
    }

    pub fn transition_remaining_ms(&self) -> u32 {
        self.transition_remaining_ms
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition_remaining_ms > 0
    }

    pub fn switches(&self) -> u32 {
        self.switches
    }

    /// Whether cars on `axis` must hold at their stop line.
    /// The buffer holds both axes regardless of which one is active.
    pub fn must_yield(&self, axis: Axis) -> bool {
        self.is_transitioning() || self.active_axis != axis
    }

    pub fn color_for(&self, axis: Axis) -> SignalColor {
        if self.is_transitioning() {
            SignalColor::Caution
        } else if self.active_axis == axis {
            SignalColor::Pass
        } else {
            SignalColor::Stop
        }
    }
}
