//! Per-direction queue counts

use log::warn;

use super::types::{Axis, Direction};

/// Number of cars per direction that have not crossed the centre line yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneQueueModel {
    counts: [u32; 4],
}

impl LaneQueueModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly spawned car.
    /// Returns its queue rank: how many cars of its direction were already active.
    pub fn register_spawn(&mut self, direction: Direction) -> u32 {
        let slot = &mut self.counts[direction.index()];
        let rank = *slot;
        *slot += 1;
        rank
    }

    /// Record that a car crossed the centre line
    pub fn release(&mut self, direction: Direction) {
        let slot = &mut self.counts[direction.index()];
        if *slot == 0 {
            warn!(
                "Queue count for {} already zero, ignoring release",
                direction.label()
            );
            return;
        }
        *slot -= 1;
    }

    pub fn count(&self, direction: Direction) -> u32 {
        self.counts[direction.index()]
    }

    pub fn axis_total(&self, axis: Axis) -> u32 {
        axis.directions().iter().map(|d| self.count(*d)).sum()
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}
