//! Standalone intersection simulation module
//!
//! This module contains the simulation engine: the traffic light, the
//! per-direction queues, car motion and the episode loop that scores a
//! control policy. It has no rendering or input dependencies and can be
//! driven from tests or the console.

mod car;
mod config;
mod episode;
mod error;
mod evaluator;
mod lane_queue;
mod policy;
pub mod render;
mod traffic_light;
mod types;

// Re-export public types for external use
pub use car::{CarUpdateResult, SimCar};
pub use config::{SimConfig, SWITCH_HIGH_THRESHOLD, SWITCH_LOW_THRESHOLD};
pub use episode::{compute_fitness, Episode, StepStatus};
pub use error::SimError;
pub use evaluator::{evaluate, evaluate_batch, rank_by_fitness, report, EpisodeReport, Outcome};
pub use lane_queue::LaneQueueModel;
pub use policy::{
    sigmoid, wants_switch, ConstantPolicy, LinearPolicy, Observation, Policy, PressurePolicy,
    HOLD_OUTPUT, SWITCH_OUTPUT,
};
pub use render::{RenderHook, Snapshot};
pub use traffic_light::{LightObservation, SimTrafficLight};
pub use types::{
    Axis, CarId, Direction, SignalColor, SimId, CAR_LENGTH, CAR_SPACING, CAR_SPEED, EXIT_MARGIN,
    FIELD_HEIGHT, FIELD_WIDTH, REFERENCE_TRANSIT_MS, SPAWN_INTERVAL_MS, STOP_MARGIN,
    STOP_ZONE_OFFSET, TARGET_CARS, TICK_CEILING, TICK_MS, TRANSITION_BUFFER_MS,
};
