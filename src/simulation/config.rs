//! Tunable parameters and the intersection geometry derived from them

use super::error::SimError;
use super::types::{
    Direction, CAR_LENGTH, CAR_SPACING, CAR_SPEED, EXIT_MARGIN, FIELD_HEIGHT, FIELD_WIDTH,
    REFERENCE_TRANSIT_MS, SPAWN_INTERVAL_MS, STOP_MARGIN, STOP_ZONE_OFFSET, TARGET_CARS,
    TICK_CEILING, TICK_MS, TRANSITION_BUFFER_MS,
};

/// Policy outputs above this value request a switch
pub const SWITCH_HIGH_THRESHOLD: f64 = 0.5;

/// Policy outputs below this value also request a switch
pub const SWITCH_LOW_THRESHOLD: f64 = 1e-5;

/// All tunables of one episode
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub tick_ms: u32,
    pub transition_ms: u32,
    pub car_speed: f32,
    pub car_spacing: f32,
    pub car_length: f32,
    /// Spawn interval is drawn uniformly from `[min, max]` after every spawn
    pub spawn_interval_min_ms: u32,
    pub spawn_interval_max_ms: u32,
    pub target_count: u32,
    pub reference_transit_ms: f64,
    pub field_width: f32,
    pub field_height: f32,
    pub exit_margin: f32,
    pub stop_zone_offset: f32,
    pub stop_margin: f32,
    pub tick_ceiling: u64,
    pub switch_high_threshold: f64,
    pub switch_low_threshold: f64,
    /// Fitness assigned to an episode that hits the tick ceiling
    pub stalled_fitness: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            transition_ms: TRANSITION_BUFFER_MS,
            car_speed: CAR_SPEED,
            car_spacing: CAR_SPACING,
            car_length: CAR_LENGTH,
            spawn_interval_min_ms: SPAWN_INTERVAL_MS,
            spawn_interval_max_ms: SPAWN_INTERVAL_MS,
            target_count: TARGET_CARS,
            reference_transit_ms: REFERENCE_TRANSIT_MS,
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            exit_margin: EXIT_MARGIN,
            stop_zone_offset: STOP_ZONE_OFFSET,
            stop_margin: STOP_MARGIN,
            tick_ceiling: TICK_CEILING,
            switch_high_threshold: SWITCH_HIGH_THRESHOLD,
            switch_low_threshold: SWITCH_LOW_THRESHOLD,
            stalled_fitness: 0.0,
        }
    }
}

impl SimConfig {
    /// The hand-driven reference run: slower arrivals, twice the completions
    pub fn manual_reference() -> Self {
        Self {
            spawn_interval_min_ms: 1200,
            spawn_interval_max_ms: 1200,
            target_count: 20,
            ..Self::default()
        }
    }

    /// Check that every tunable is usable by the engine
    pub fn validate(&self) -> Result<(), SimError> {
        if self.tick_ms == 0 {
            return Err(SimError::InvalidConfig("tick_ms must be positive".into()));
        }
        if self.target_count == 0 {
            return Err(SimError::InvalidConfig("target_count must be positive".into()));
        }
        if self.tick_ceiling == 0 {
            return Err(SimError::InvalidConfig("tick_ceiling must be positive".into()));
        }
        if self.spawn_interval_min_ms > self.spawn_interval_max_ms {
            return Err(SimError::InvalidConfig(format!(
                "spawn interval range {}..={} is inverted",
                self.spawn_interval_min_ms, self.spawn_interval_max_ms
            )));
        }
        let lengths = [
            ("car_speed", self.car_speed),
            ("car_spacing", self.car_spacing),
            ("field_width", self.field_width),
            ("field_height", self.field_height),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        let offsets = [
            ("car_length", self.car_length),
            ("exit_margin", self.exit_margin),
            ("stop_zone_offset", self.stop_zone_offset),
            ("stop_margin", self.stop_margin),
        ];
        for (name, value) in offsets {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !self.reference_transit_ms.is_finite() || self.reference_transit_ms <= 0.0 {
            return Err(SimError::InvalidConfig(
                "reference_transit_ms must be finite and positive".into(),
            ));
        }
        if !self.stalled_fitness.is_finite() {
            return Err(SimError::InvalidConfig("stalled_fitness must be finite".into()));
        }
        let thresholds_finite =
            self.switch_low_threshold.is_finite() && self.switch_high_threshold.is_finite();
        if !thresholds_finite || self.switch_low_threshold >= self.switch_high_threshold {
            return Err(SimError::InvalidConfig(format!(
                "switch thresholds out of order: low {} >= high {}",
                self.switch_low_threshold, self.switch_high_threshold
            )));
        }
        Ok(())
    }

    pub fn center_x(&self) -> f32 {
        self.field_width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.field_height / 2.0
    }

    /// Centre of the field on the direction's travel axis
    pub fn midpoint(&self, direction: Direction) -> f32 {
        match direction {
            Direction::EastWest | Direction::WestEast => self.center_x(),
            Direction::NorthSouth | Direction::SouthNorth => self.center_y(),
        }
    }

    /// Starting coordinate on the travel axis
    pub fn entry_position(&self, direction: Direction) -> f32 {
        match direction {
            Direction::EastWest => 0.0,
            Direction::WestEast => self.field_width,
            Direction::NorthSouth => 0.0,
            Direction::SouthNorth => self.field_height,
        }
    }

    /// Fixed cross-axis coordinate of the direction's lane
    pub fn lane_coordinate(&self, direction: Direction) -> f32 {
        match direction {
            Direction::EastWest => self.center_y() + 15.0,
            Direction::WestEast => self.center_y() - 30.0,
            Direction::NorthSouth => self.center_x() - 30.0,
            Direction::SouthNorth => self.center_x() + 15.0,
        }
    }

    /// Where the first car of an empty queue stops.
    ///
    /// A car's position is its minimum-coordinate corner, so cars travelling
    /// toward decreasing coordinates stop one car length earlier.
    pub fn base_stop_line(&self, direction: Direction) -> f32 {
        let mid = self.midpoint(direction);
        if direction.sign() > 0.0 {
            mid - self.stop_zone_offset
        } else {
            mid + self.stop_zone_offset - self.car_length
        }
    }

    /// Coordinate past which a car counts as having left the field
    pub fn exit_line(&self, direction: Direction) -> f32 {
        match direction {
            Direction::EastWest => self.field_width + self.exit_margin,
            Direction::WestEast => -self.exit_margin,
            Direction::NorthSouth => self.field_height + self.exit_margin,
            Direction::SouthNorth => -self.exit_margin,
        }
    }
}
