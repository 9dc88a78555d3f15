//! Error conditions raised by the simulation engine

use thiserror::Error;

/// Errors that can occur while configuring or scoring an episode.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Fitness was requested for an episode that never produced a usable mean transit time
    #[error("degenerate episode: {completed} cars completed with cumulative transit time {cumulative_transit_ms} ms")]
    DegenerateEpisode {
        completed: u32,
        cumulative_transit_ms: u64,
    },
    /// The tick ceiling was reached before enough cars completed
    #[error("episode stalled after {ticks} ticks with {completed}/{target} cars completed")]
    Stalled { ticks: u64, completed: u32, target: u32 },
    /// A report was requested before the episode finished
    #[error("episode is still running after {ticks} ticks")]
    StillRunning { ticks: u64 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
