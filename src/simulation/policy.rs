//! Policy interface and built-in policies.
//!
//! A policy is a pure function from an [`Observation`] to a scalar decision.
//! The engine calls it once per tick and turns the scalar into a switch
//! request with [`wants_switch`]. Anything that produces policies (an
//! evolutionary search, a hand-written rule) lives outside the engine.

use super::config::SimConfig;
use super::types::Axis;

/// What a policy sees on each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Summed waiting time (ms) of active, not yet crossed cars on the east-west axis
    pub ew_pressure: f64,
    /// Summed waiting time (ms) of active, not yet crossed cars on the north-south axis
    pub ns_pressure: f64,
    /// 1 when the east-west axis has right of way, 0 otherwise
    pub light_state: u8,
}

impl Observation {
    /// Fixed-length input vector in network order
    pub fn as_inputs(&self) -> [f64; 3] {
        [self.ew_pressure, self.ns_pressure, f64::from(self.light_state)]
    }

    pub fn active_axis(&self) -> Axis {
        if self.light_state == 1 {
            Axis::EastWest
        } else {
            Axis::NorthSouth
        }
    }

    pub fn pressure(&self, axis: Axis) -> f64 {
        match axis {
            Axis::EastWest => self.ew_pressure,
            Axis::NorthSouth => self.ns_pressure,
        }
    }
}

/// Maps an observation to a decision scalar
pub trait Policy {
    fn decide(&self, observation: &Observation) -> f64;
}

impl<F> Policy for F
where
    F: Fn(&Observation) -> f64,
{
    fn decide(&self, observation: &Observation) -> f64 {
        self(observation)
    }
}

/// Whether a decision scalar asks for a switch.
///
/// Both ends of the activation range count as a request: anything above the
/// high threshold and anything below the low threshold. Non-finite values are
/// never a request.
pub fn wants_switch(output: f64, config: &SimConfig) -> bool {
    if !output.is_finite() {
        return false;
    }
    output > config.switch_high_threshold || output < config.switch_low_threshold
}

/// Always returns the same value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantPolicy(pub f64);

impl Policy for ConstantPolicy {
    fn decide(&self, _observation: &Observation) -> f64 {
        self.0
    }
}

/// Output that [`wants_switch`] treats as a request under the default thresholds
pub const SWITCH_OUTPUT: f64 = 1.0;

/// Output that [`wants_switch`] treats as holding under the default thresholds
pub const HOLD_OUTPUT: f64 = 0.2;

/// Requests a switch when the yielding axis has built up more waiting time
/// than the active axis, scaled by `ratio`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressurePolicy {
    pub ratio: f64,
}

impl Default for PressurePolicy {
    fn default() -> Self {
        Self { ratio: 1.0 }
    }
}

impl Policy for PressurePolicy {
    fn decide(&self, observation: &Observation) -> f64 {
        let active = observation.active_axis();
        let waiting = observation.pressure(active.other());
        let flowing = observation.pressure(active);
        if waiting > flowing * self.ratio {
            SWITCH_OUTPUT
        } else {
            HOLD_OUTPUT
        }
    }
}

/// A single sigmoid neuron over the observation vector.
///
/// Pressures are multiplied by `input_scale` before weighting so that
/// millisecond sums stay inside the sigmoid's useful range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearPolicy {
    pub weights: [f64; 3],
    pub bias: f64,
    pub input_scale: f64,
}

impl LinearPolicy {
    pub fn new(weights: [f64; 3], bias: f64) -> Self {
        Self {
            weights,
            bias,
            input_scale: 1e-4,
        }
    }
}

impl Policy for LinearPolicy {
    fn decide(&self, observation: &Observation) -> f64 {
        let [ew, ns, light] = observation.as_inputs();
        let inputs = [ew * self.input_scale, ns * self.input_scale, light];
        let sum: f64 = self.bias
            + inputs
                .iter()
                .zip(self.weights.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>();
        sigmoid(sum)
    }
}

/// Logistic function, saturating at the infinities
pub fn sigmoid(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    let clamped = x.clamp(-700.0, 700.0);
    1.0 / (1.0 + (-clamped).exp())
}
