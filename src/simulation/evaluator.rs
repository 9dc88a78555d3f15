//! Scoring policies for an external search procedure

use std::cmp::Reverse;

use log::info;
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use super::config::SimConfig;
use super::episode::Episode;
use super::error::SimError;
use super::policy::Policy;

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Stalled,
}

/// Result of evaluating one policy
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    pub outcome: Outcome,
    /// Worst-case `stalled_fitness` when the episode stalled
    pub fitness: f64,
    pub spawned: u32,
    pub completed: u32,
    pub ticks: u64,
    pub simulated_ms: u64,
    pub mean_transit_ms: Option<f64>,
    pub switches: u32,
}

/// Run a fresh episode for `policy` and score it.
///
/// A stalled episode is reported with the configured worst-case fitness;
/// degenerate episodes and invalid configurations are errors.
pub fn evaluate<P: Policy + ?Sized>(
    policy: &P,
    config: &SimConfig,
    seed: Option<u64>,
) -> Result<EpisodeReport, SimError> {
    let mut episode = match seed {
        Some(seed) => Episode::with_seed(config.clone(), seed)?,
        None => Episode::new(config.clone())?,
    };
    episode.run(policy);
    report(&episode)
}

/// Build the report for an episode that has stopped stepping
pub fn report(episode: &Episode) -> Result<EpisodeReport, SimError> {
    let (outcome, fitness) = match episode.fitness() {
        Ok(fitness) => (Outcome::Completed, fitness),
        Err(SimError::Stalled { .. }) => (Outcome::Stalled, episode.config().stalled_fitness),
        Err(e) => return Err(e),
    };
    Ok(EpisodeReport {
        outcome,
        fitness,
        spawned: episode.spawned(),
        completed: episode.completed(),
        ticks: episode.ticks(),
        simulated_ms: episode.time_ms(),
        mean_transit_ms: episode.mean_transit_ms(),
        switches: episode.light().switches(),
    })
}

/// Evaluate every policy in its own episode on the rayon thread pool.
///
/// With a seed, every policy faces the same arrival sequence. Results keep
/// the order of `policies`.
pub fn evaluate_batch(
    policies: &[&(dyn Policy + Sync)],
    config: &SimConfig,
    seed: Option<u64>,
) -> Vec<Result<EpisodeReport, SimError>> {
    let results: Vec<Result<EpisodeReport, SimError>> = policies
        .par_iter()
        .map(|policy| evaluate(*policy, config, seed))
        .collect();
    info!("Evaluated {} policies", results.len());
    results
}

/// Indices of successful reports ordered best fitness first
pub fn rank_by_fitness(results: &[Result<EpisodeReport, SimError>]) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = results
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.as_ref().ok().map(|report| (i, report.fitness)))
        .collect();
    ranked.sort_by_key(|(i, fitness)| (Reverse(OrderedFloat(*fitness)), *i));
    ranked.into_iter().map(|(i, _)| i).collect()
}
