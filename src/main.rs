use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use intersection_sim::simulation::{
    self, evaluate_batch, rank_by_fitness, render, ConstantPolicy, Episode, EpisodeReport,
    LinearPolicy, Policy, PressurePolicy, RenderHook, SimConfig, Snapshot, HOLD_OUTPUT, SWITCH_OUTPUT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyKind {
    /// Request a switch on every tick
    AlwaysSwitch,
    /// Never request a switch
    NeverSwitch,
    /// Return the value given by --output
    Constant,
    /// Switch when the waiting axis outweighs the flowing axis
    Pressure,
    /// Single sigmoid neuron with --weights and --bias
    Linear,
}

#[derive(Parser)]
#[command(name = "intersection_sim")]
#[command(about = "Score traffic light policies on a simulated intersection")]
struct Cli {
    /// Policy to evaluate
    #[arg(long, value_enum, default_value_t = PolicyKind::Pressure)]
    policy: PolicyKind,

    /// Output of the constant policy
    #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
    output: f64,

    /// Pressure ratio of the pressure policy
    #[arg(long, default_value = "1.0")]
    ratio: f64,

    /// Weights of the linear policy: ew pressure, ns pressure, light state
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "1.0,-1.0,0.0",
        allow_hyphen_values = true
    )]
    weights: Vec<f64>,

    /// Bias of the linear policy
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    bias: f64,

    /// Number of episodes to run
    #[arg(long, default_value = "1")]
    episodes: u32,

    /// Seed for reproducible arrivals; episode i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Completions needed to end an episode
    #[arg(long)]
    target_cars: Option<u32>,

    /// Upper bound on ticks per episode
    #[arg(long)]
    tick_ceiling: Option<u64>,

    /// Fixed spawn interval in milliseconds
    #[arg(long)]
    spawn_interval: Option<u32>,

    /// Use the slower hand-driven reference configuration
    #[arg(long)]
    manual_reference: bool,

    /// Print a map of the intersection every N ticks
    #[arg(long)]
    render_every: Option<u64>,

    /// Evaluate every built-in policy on the same arrivals and rank them
    #[arg(long)]
    compare: bool,
}

impl Cli {
    fn config(&self) -> SimConfig {
        let mut config = if self.manual_reference {
            SimConfig::manual_reference()
        } else {
            SimConfig::default()
        };
        if let Some(target) = self.target_cars {
            config.target_count = target;
        }
        if let Some(ceiling) = self.tick_ceiling {
            config.tick_ceiling = ceiling;
        }
        if let Some(interval) = self.spawn_interval {
            config.spawn_interval_min_ms = interval;
            config.spawn_interval_max_ms = interval;
        }
        config
    }

    fn linear_policy(&self) -> Result<LinearPolicy> {
        ensure!(
            self.weights.len() == 3,
            "--weights takes exactly 3 values, got {}",
            self.weights.len()
        );
        Ok(LinearPolicy::new(
            [self.weights[0], self.weights[1], self.weights[2]],
            self.bias,
        ))
    }

    fn policy(&self) -> Result<Box<dyn Policy + Sync>> {
        let policy: Box<dyn Policy + Sync> = match self.policy {
            PolicyKind::AlwaysSwitch => Box::new(ConstantPolicy(SWITCH_OUTPUT)),
            PolicyKind::NeverSwitch => Box::new(ConstantPolicy(HOLD_OUTPUT)),
            PolicyKind::Constant => Box::new(ConstantPolicy(self.output)),
            PolicyKind::Pressure => Box::new(PressurePolicy { ratio: self.ratio }),
            PolicyKind::Linear => Box::new(self.linear_policy()?),
        };
        Ok(policy)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,intersection_sim=info"),
    )
    .init();

    let cli = Cli::parse();
    let config = cli.config();
    config.validate().context("Invalid simulation configuration")?;

    if cli.compare {
        run_comparison(&cli, &config)
    } else {
        run_episodes(&cli, &config)
    }
}

/// Prints the map to stdout every `every` ticks
struct MapPrinter<'a> {
    every: u64,
    config: &'a SimConfig,
}

impl RenderHook for MapPrinter<'_> {
    fn on_tick(&mut self, snapshot: &Snapshot<'_>) {
        if snapshot.tick % self.every == 0 {
            println!("--- {} ---", render::summary(snapshot));
            println!("{}", render::draw_map(snapshot, self.config));
        }
    }
}

fn log_report(report: &EpisodeReport) {
    info!("=== EPISODE COMPLETE ===");
    info!("Outcome: {:?}", report.outcome);
    info!("Fitness: {:.4}", report.fitness);
    info!("Cars spawned: {}", report.spawned);
    info!("Cars completed: {}", report.completed);
    match report.mean_transit_ms {
        Some(mean) => info!("Mean transit time: {:.1} ms", mean),
        None => info!("Mean transit time: n/a"),
    }
    info!("Light switches: {}", report.switches);
    info!("Ticks: {}", report.ticks);
}

/// Run the selected policy for the requested number of episodes
fn run_episodes(cli: &Cli, config: &SimConfig) -> Result<()> {
    let policy = cli.policy()?;
    info!("Evaluating {:?} policy over {} episode(s)", cli.policy, cli.episodes);

    let mut total_fitness = 0.0;
    for index in 0..cli.episodes {
        let seed = cli.seed.map(|s| s.wrapping_add(u64::from(index)));
        let mut episode = match seed {
            Some(seed) => Episode::with_seed(config.clone(), seed),
            None => Episode::new(config.clone()),
        }
        .context("Failed to create episode")?;

        match cli.render_every {
            Some(every) if every > 0 => {
                let mut printer = MapPrinter { every, config };
                episode.run_with_hook(policy.as_ref(), &mut printer);
            }
            _ => {
                episode.run(policy.as_ref());
            }
        }

        let report = simulation::report(&episode)
            .with_context(|| format!("Episode {} could not be scored", index + 1))?;
        log_report(&report);
        total_fitness += report.fitness;
    }

    if cli.episodes > 0 {
        info!(
            "Average fitness: {:.4}",
            total_fitness / f64::from(cli.episodes)
        );
    }
    Ok(())
}

/// Evaluate the built-in policies side by side
fn run_comparison(cli: &Cli, config: &SimConfig) -> Result<()> {
    let always = ConstantPolicy(SWITCH_OUTPUT);
    let never = ConstantPolicy(HOLD_OUTPUT);
    let pressure = PressurePolicy { ratio: cli.ratio };
    let linear = cli.linear_policy()?;
    let names = ["always-switch", "never-switch", "pressure", "linear"];
    let policies: [&(dyn Policy + Sync); 4] = [&always, &never, &pressure, &linear];

    let results = evaluate_batch(&policies, config, cli.seed);
    for (name, result) in names.iter().zip(results.iter()) {
        match result {
            Ok(report) => info!(
                "{}: {:?}, fitness {:.4}, {} switches",
                name, report.outcome, report.fitness, report.switches
            ),
            Err(e) => info!("{}: {}", name, e),
        }
    }

    info!("=== RANKING ===");
    for (place, index) in rank_by_fitness(&results).into_iter().enumerate() {
        info!("{}. {}", place + 1, names[index]);
    }
    Ok(())
}
