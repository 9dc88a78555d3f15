//! Car movement logic for the intersection simulation
//!
//! A car drives along a single lane at constant speed and holds inside its
//! stop zone while its axis must yield.

use super::config::SimConfig;
use super::lane_queue::LaneQueueModel;
use super::traffic_light::SimTrafficLight;
use super::types::{CarId, Direction};

/// Result of a car update indicating what action should be taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarUpdateResult {
    Continue, // Car keeps driving (or holding) on its lane
    Crossed,  // Car passed the centre line during this update
    Exited,   // Car left the field and should be finalized
}

/// A car in the intersection simulation
#[derive(Debug, Clone)]
pub struct SimCar {
    pub id: CarId,
    pub direction: Direction,
    /// Coordinate along the direction's travel axis
    pub position: f32,
    /// Fixed cross-axis coordinate of the lane
    pub lane: f32,
    pub speed: f32,
    pub stopped: bool,
    pub crossed: bool,
    pub spawn_time_ms: u64,
    /// Active cars of the same direction at spawn time
    pub queue_rank: u32,
}

impl SimCar {
    pub fn new(
        id: CarId,
        direction: Direction,
        config: &SimConfig,
        spawn_time_ms: u64,
        queue_rank: u32,
    ) -> Self {
        Self {
            id,
            direction,
            position: config.entry_position(direction),
            lane: config.lane_coordinate(direction),
            speed: config.car_speed,
            stopped: false,
            crossed: false,
            spawn_time_ms,
            queue_rank,
        }
    }

    /// Screen coordinates of the car's reference corner
    pub fn xy(&self) -> (f32, f32) {
        match self.direction {
            Direction::EastWest | Direction::WestEast => (self.position, self.lane),
            Direction::NorthSouth | Direction::SouthNorth => (self.lane, self.position),
        }
    }

    /// This car's personal stop line, pushed back one spacing per car queued ahead of it
    pub fn effective_stop_line(&self, config: &SimConfig) -> f32 {
        config.base_stop_line(self.direction)
            - self.direction.sign() * self.queue_rank as f32 * config.car_spacing
    }

    /// Whether the car sits between its personal stop line and the base line
    /// (plus the overshoot margin)
    pub fn near_stop_line(&self, config: &SimConfig) -> bool {
        let base = config.base_stop_line(self.direction);
        let effective = self.effective_stop_line(config);
        let (low, high) = if self.direction.sign() > 0.0 {
            (effective, base + config.stop_margin)
        } else {
            (base - config.stop_margin, effective)
        };
        low <= self.position && self.position <= high
    }

    pub fn has_exited(&self, config: &SimConfig) -> bool {
        let exit = config.exit_line(self.direction);
        if self.direction.sign() > 0.0 {
            self.position > exit
        } else {
            self.position < exit
        }
    }

    /// Set `crossed` once the car is past the centre line of its axis.
    /// Returns true only on the update where it first becomes set.
    pub fn update_crossed(&mut self, config: &SimConfig) -> bool {
        if self.crossed {
            return false;
        }
        let mid = config.midpoint(self.direction);
        let past = if self.direction.sign() > 0.0 {
            self.position > mid
        } else {
            self.position < mid
        };
        if past {
            self.crossed = true;
        }
        past
    }

    /// Recompute `stopped` and advance unless held at the stop line
    pub fn apply_motion(&mut self, config: &SimConfig, light: &SimTrafficLight) {
        self.stopped = self.near_stop_line(config) && light.must_yield(self.direction.axis());
        if !self.stopped {
            self.position += self.direction.sign() * self.speed;
        }
    }

    /// Time spent waiting or driving since spawn
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.spawn_time_ms)
    }

    /// Update car for one tick.
    ///
    /// The crossing check runs against the position before this tick's move,
    /// so the queue count is released before the car travels on.
    pub fn update(
        &mut self,
        config: &SimConfig,
        light: &SimTrafficLight,
        lanes: &mut LaneQueueModel,
    ) -> CarUpdateResult {
        if self.has_exited(config) {
            return CarUpdateResult::Exited;
        }

        let just_crossed = self.update_crossed(config);
        if just_crossed {
            lanes.release(self.direction);
        }

        self.apply_motion(config, light);

        if just_crossed {
            CarUpdateResult::Crossed
        } else {
            CarUpdateResult::Continue
        }
    }
}
