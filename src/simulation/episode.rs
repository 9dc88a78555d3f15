//! One evaluation run of a policy
//!
//! An [`Episode`] owns every piece of mutable simulation state: the light,
//! the queue counts, the live cars and the completion metrics. It is created
//! fresh per evaluation and advanced one tick at a time with [`Episode::step`].

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand::SeedableRng;

use super::car::{CarUpdateResult, SimCar};
use super::config::SimConfig;
use super::error::SimError;
use super::lane_queue::LaneQueueModel;
use super::policy::{wants_switch, Observation, Policy};
use super::render::{RenderHook, Snapshot};
use super::traffic_light::SimTrafficLight;
use super::types::{Axis, CarId, Direction, SimId};

/// Status returned by every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Continue,
    /// The target number of cars has completed
    Done,
    /// The tick ceiling was reached first
    Stalled,
}

/// The state of a single evaluation run
pub struct Episode {
    config: SimConfig,

    light: SimTrafficLight,

    lanes: LaneQueueModel,

    /// Live cars in spawn order
    cars: Vec<SimCar>,

    /// Next ID to assign
    next_id: usize,

    /// Simulated time in milliseconds
    time_ms: u64,

    ticks: u64,

    last_spawn_ms: u64,

    /// Zero until the first spawn so the first car appears on the first tick
    spawn_interval_ms: u32,

    cumulative_transit_ms: u64,

    completed: u32,

    spawned: u32,

    /// Optional seeded RNG for reproducible episodes
    rng: Option<StdRng>,

    status: StepStatus,
}

impl Episode {
    fn new_internal(config: SimConfig, rng: Option<StdRng>) -> Result<Self, SimError> {
        config.validate()?;
        let light = SimTrafficLight::new(Axis::EastWest, config.transition_ms);
        Ok(Self {
            config,
            light,
            lanes: LaneQueueModel::new(),
            cars: Vec::new(),
            next_id: 0,
            time_ms: 0,
            ticks: 0,
            last_spawn_ms: 0,
            spawn_interval_ms: 0,
            cumulative_transit_ms: 0,
            completed: 0,
            spawned: 0,
            rng,
            status: StepStatus::Continue,
        })
    }

    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        Self::new_internal(config, None)
    }

    /// Create an episode whose spawn directions and intervals are reproducible
    pub fn with_seed(config: SimConfig, seed: u64) -> Result<Self, SimError> {
        Self::new_internal(config, Some(StdRng::seed_from_u64(seed)))
    }

    /// Get a random value in the given range, using seeded RNG if available
    fn random_interval(&mut self) -> u32 {
        let range = self.config.spawn_interval_min_ms..=self.config.spawn_interval_max_ms;
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    fn random_direction(&mut self) -> Direction {
        let choice = match &mut self.rng {
            Some(rng) => Direction::ALL.choose(rng).copied(),
            None => Direction::ALL.choose(&mut rand::rng()).copied(),
        };
        choice.unwrap_or(Direction::EastWest)
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn light(&self) -> &SimTrafficLight {
        &self.light
    }

    pub fn lanes(&self) -> &LaneQueueModel {
        &self.lanes
    }

    /// Live cars in spawn order
    pub fn cars(&self) -> &[SimCar] {
        &self.cars
    }

    pub fn time_ms(&self) -> u64 {
        self.time_ms
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn cumulative_transit_ms(&self) -> u64 {
        self.cumulative_transit_ms
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Summed waiting time of the cars on `axis` that have not crossed yet
    pub fn waiting_pressure(&self, axis: Axis) -> f64 {
        self.cars
            .iter()
            .filter(|car| car.direction.axis() == axis && !car.crossed)
            .map(|car| car.elapsed_ms(self.time_ms) as f64)
            .sum()
    }

    pub fn observe(&self) -> Observation {
        Observation {
            ew_pressure: self.waiting_pressure(Axis::EastWest),
            ns_pressure: self.waiting_pressure(Axis::NorthSouth),
            light_state: u8::from(self.light.active_axis() == Axis::EastWest),
        }
    }

    /// Add a car at the entry of `direction`, ranked behind the cars already queued there
    pub fn spawn_car(&mut self, direction: Direction) -> CarId {
        let id = CarId(self.next_sim_id());
        let rank = self.lanes.register_spawn(direction);
        let car = SimCar::new(id, direction, &self.config, self.time_ms, rank);
        debug!(
            "Spawned car {:?} heading {} at {} ms, queue rank {}",
            id.0,
            direction.label(),
            self.time_ms,
            rank
        );
        self.cars.push(car);
        self.spawned += 1;
        id
    }

    fn spawn_due_cars(&mut self) {
        if self.time_ms - self.last_spawn_ms < u64::from(self.spawn_interval_ms) {
            return;
        }
        self.spawn_interval_ms = self.random_interval();
        let direction = self.random_direction();
        self.spawn_car(direction);
        self.last_spawn_ms = self.time_ms;
    }

    /// Finalize exited cars, then run crossing and motion for the rest
    fn update_cars(&mut self) {
        let now = self.time_ms;
        let config = &self.config;
        let light = &self.light;
        let lanes = &mut self.lanes;
        let cumulative = &mut self.cumulative_transit_ms;
        let completed = &mut self.completed;

        self.cars.retain_mut(|car| match car.update(config, light, lanes) {
            CarUpdateResult::Exited => {
                *cumulative += car.elapsed_ms(now);
                *completed += 1;
                debug!(
                    "Car {:?} exited after {} ms",
                    car.id.0,
                    car.elapsed_ms(now)
                );
                false
            }
            CarUpdateResult::Crossed | CarUpdateResult::Continue => true,
        });
    }

    /// Advance the episode by one tick.
    ///
    /// Order within a tick: observe, decide, advance the light buffer, spawn,
    /// step cars, advance the clock. Once the episode is done or stalled,
    /// further calls return the same status without changing state.
    pub fn step<P: Policy + ?Sized>(&mut self, policy: &P) -> StepStatus {
        if self.status != StepStatus::Continue {
            return self.status;
        }

        let observation = self.observe();
        let output = policy.decide(&observation);
        if !output.is_finite() {
            debug!("Ignoring non-finite policy output {output} at tick {}", self.ticks);
        } else if wants_switch(output, &self.config) {
            self.light.request_switch();
        }

        self.light.advance(self.config.tick_ms);

        self.spawn_due_cars();

        self.update_cars();

        self.time_ms += u64::from(self.config.tick_ms);
        self.ticks += 1;

        self.status = if self.completed >= self.config.target_count {
            info!(
                "Episode finished in {} ticks, {} cars completed, {} ms cumulative transit",
                self.ticks, self.completed, self.cumulative_transit_ms
            );
            StepStatus::Done
        } else if self.ticks >= self.config.tick_ceiling {
            warn!(
                "Episode stalled at tick {} with {}/{} cars completed",
                self.ticks, self.completed, self.config.target_count
            );
            StepStatus::Stalled
        } else {
            StepStatus::Continue
        };
        self.status
    }

    /// Step until the episode is done or stalled
    pub fn run<P: Policy + ?Sized>(&mut self, policy: &P) -> StepStatus {
        loop {
            let status = self.step(policy);
            if status != StepStatus::Continue {
                return status;
            }
        }
    }

    /// Like [`Episode::run`], handing a read-only snapshot to `hook` after every tick
    pub fn run_with_hook<P, H>(&mut self, policy: &P, hook: &mut H) -> StepStatus
    where
        P: Policy + ?Sized,
        H: RenderHook + ?Sized,
    {
        loop {
            let status = self.step(policy);
            hook.on_tick(&self.snapshot());
            if status != StepStatus::Continue {
                return status;
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            tick: self.ticks,
            time_ms: self.time_ms,
            light: &self.light,
            lanes: &self.lanes,
            cars: &self.cars,
            spawned: self.spawned,
            completed: self.completed,
        }
    }

    /// Observed mean transit time over completed cars, if any completed.
    ///
    /// Scoring divides by the target count instead, see [`compute_fitness`].
    pub fn mean_transit_ms(&self) -> Option<f64> {
        (self.completed > 0).then(|| self.cumulative_transit_ms as f64 / f64::from(self.completed))
    }

    /// Fitness of a finished episode
    pub fn fitness(&self) -> Result<f64, SimError> {
        match self.status {
            StepStatus::Continue => Err(SimError::StillRunning { ticks: self.ticks }),
            StepStatus::Stalled => Err(SimError::Stalled {
                ticks: self.ticks,
                completed: self.completed,
                target: self.config.target_count,
            }),
            StepStatus::Done => compute_fitness(
                self.cumulative_transit_ms,
                self.completed,
                self.config.target_count,
                self.config.reference_transit_ms,
            ),
        }
    }
}

/// `reference / mean_transit`, where the mean divides by `target_count`.
///
/// Cars that finish on the last tick beyond the target still add their
/// transit time, so an overshoot lowers the score.
pub fn compute_fitness(
    cumulative_transit_ms: u64,
    completed: u32,
    target_count: u32,
    reference_transit_ms: f64,
) -> Result<f64, SimError> {
    if completed == 0 || cumulative_transit_ms == 0 || target_count == 0 {
        return Err(SimError::DegenerateEpisode {
            completed,
            cumulative_transit_ms,
        });
    }
    let mean = cumulative_transit_ms as f64 / f64::from(target_count);
    Ok(reference_transit_ms / mean)
}
