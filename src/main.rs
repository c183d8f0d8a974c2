//! Evo Arena - Entry Point
//!
//! Seeds a world from config, optionally attaches an LLM decision source,
//! and runs the simulation headless or paced at the configured tick rate.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use evo_arena::core::config::{BoundsMode, SimulationConfig};
use evo_arena::core::error::{EvoError, Result};
use evo_arena::decision::DecisionBridge;
use evo_arena::llm::client::LlmClient;
use evo_arena::render::Snapshot;
use evo_arena::simulation::{Simulation, SimulationEvent};
use evo_arena::world::World;

/// Ticks to run headless when no count is given
const DEFAULT_HEADLESS_TICKS: u64 = 3000;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BoundsArg {
    Wrap,
    Clamp,
}

impl From<BoundsArg> for BoundsMode {
    fn from(arg: BoundsArg) -> Self {
        match arg {
            BoundsArg::Wrap => BoundsMode::Wrap,
            BoundsArg::Clamp => BoundsMode::Clamp,
        }
    }
}

/// Evo Arena - organisms foraging, mating and evolving in a 2D arena
#[derive(Parser, Debug)]
#[command(name = "evo-arena")]
#[command(about = "Run the evolution arena, optionally with LLM-suggested actions")]
struct Args {
    /// TOML config file; unspecified fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run (headless default: 3000; paced default: forever)
    #[arg(long)]
    ticks: Option<u64>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Initial population override
    #[arg(long)]
    population: Option<usize>,

    /// Food item count override
    #[arg(long)]
    food: Option<usize>,

    /// Obstacle count override
    #[arg(long)]
    obstacles: Option<usize>,

    /// Edge behavior override
    #[arg(long, value_enum)]
    bounds: Option<BoundsArg>,

    /// Pace ticks at the configured tick rate instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Run without an external decision source
    #[arg(long)]
    no_llm: bool,

    /// Tracing filter used when RUST_LOG is unset
    #[arg(long, default_value = "evo_arena=info")]
    log_filter: String,

    /// Log population stats every N ticks
    #[arg(long, default_value_t = 150)]
    stats_every: u64,

    /// Append a JSON render snapshot to this file every `snapshot_every` ticks
    #[arg(long)]
    snapshots: Option<PathBuf>,

    #[arg(long, default_value_t = 30)]
    snapshot_every: u64,
}

impl Args {
    fn load_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(population) = self.population {
            config.initial_population = population;
        }
        if let Some(food) = self.food {
            config.food_count = food;
        }
        if let Some(obstacles) = self.obstacles {
            config.obstacle_count = obstacles;
        }
        if let Some(bounds) = self.bounds {
            config.bounds = bounds.into();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Per-tick logging and snapshot output
struct Observer {
    stats_every: u64,
    snapshot_every: u64,
    snapshots: Option<BufWriter<File>>,
    error: Option<EvoError>,
}

impl Observer {
    fn on_tick(&mut self, world: &World, events: &[SimulationEvent]) -> ControlFlow<()> {
        for event in events {
            tracing::trace!(?event, "simulation event");
        }

        let tick = world.current_tick;
        if self.stats_every > 0 && tick % self.stats_every == 0 {
            let stats = world.stats();
            tracing::info!(
                tick,
                population = stats.population,
                food = stats.food,
                mean_energy = stats.mean_energy,
                mean_size = stats.mean_size,
                mean_speed = stats.mean_speed,
                awaiting = stats.awaiting_decisions,
                births = stats.totals.births,
                deaths = stats.totals.deaths,
                "population stats"
            );
        }

        if self.snapshot_every > 0 && tick % self.snapshot_every == 0 {
            if let Err(e) = self.write_snapshot(world) {
                self.error = Some(e);
                return ControlFlow::Break(());
            }
        }

        if world.population() == 0 {
            tracing::info!(tick, "population extinct");
            return ControlFlow::Break(());
        }

        ControlFlow::Continue(())
    }

    fn write_snapshot(&mut self, world: &World) -> Result<()> {
        if let Some(out) = self.snapshots.as_mut() {
            writeln!(out, "{}", Snapshot::capture(world).to_json()?)?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.load_config()?;
    tracing::info!(seed = ?config.seed, width = config.width, height = config.height, "Evo Arena starting...");

    // Runtime for decision requests; the simulation itself stays on this thread
    let rt = Runtime::new()?;
    let world = World::seeded(config)?;
    let mut sim = match build_bridge(&args, &world.config, &rt) {
        Some(bridge) => Simulation::with_bridge(world, bridge),
        None => Simulation::new(world),
    };

    let mut observer = Observer {
        stats_every: args.stats_every,
        snapshot_every: args.snapshot_every,
        snapshots: match &args.snapshots {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        },
        error: None,
    };

    if args.realtime {
        sim.run_paced(args.ticks, |world, events| observer.on_tick(world, events));
    } else {
        for _ in 0..args.ticks.unwrap_or(DEFAULT_HEADLESS_TICKS) {
            let events = sim.step();
            if observer.on_tick(&sim.world, &events).is_break() {
                break;
            }
        }
    }

    if let Some(out) = observer.snapshots.as_mut() {
        out.flush()?;
    }
    if let Some(e) = observer.error.take() {
        return Err(e);
    }

    let stats = sim.world.stats();
    tracing::info!(
        tick = stats.tick,
        population = stats.population,
        births = stats.totals.births,
        deaths = stats.totals.deaths,
        evictions = stats.totals.evictions,
        meals = stats.totals.meals,
        "simulation finished"
    );

    // In-flight requests are abandoned; their results have nowhere to go
    rt.shutdown_timeout(Duration::from_millis(100));
    Ok(())
}

fn build_bridge(args: &Args, config: &SimulationConfig, rt: &Runtime) -> Option<DecisionBridge> {
    if args.no_llm {
        tracing::info!("running without external decisions");
        return None;
    }

    let timeout = config.decision_timeout();
    match LlmClient::from_env().and_then(|client| client.with_timeout(timeout)) {
        Ok(client) => {
            tracing::info!(model = client.model(), format = ?client.api_format(), "decision source attached");
            Some(DecisionBridge::new(Arc::new(client), rt.handle().clone(), timeout))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM unavailable - running without external decisions");
            None
        }
    }
}
