#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for the robot arena.
//!
//! The driver configures an arena, fills it with robots and obstacles, runs the
//! tick pipeline through the cadence system and prints the resulting roster.
//! Worlds can be saved to and loaded from disk or moved around as one-line
//! transfer strings.

mod config;
mod transfer;

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use robot_arena_core::{AgentKind, Command, Event, ObstacleShape, Placement};
use robot_arena_system_cadence::{Cadence, Config as CadenceConfig};
use robot_arena_system_census::{roster, Census};
use robot_arena_world::{self as world, persistence, query, Config, World};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ArenaFile;

const DEFAULT_TICKS: u64 = 500;
const DEFAULT_TICK_INTERVAL_MS: u64 = 10;
const MAX_TICKS_PER_FRAME: u32 = 8;

/// Runs a robot arena without a window and reports the final population.
#[derive(Debug, Parser)]
#[command(name = "robot-arena", version)]
struct Cli {
    /// TOML file providing defaults for the options below.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Arena width.
    #[arg(long)]
    width: Option<f64>,
    /// Arena height.
    #[arg(long)]
    height: Option<f64>,
    /// Band reserved above the top wall.
    #[arg(long)]
    wall_inset: Option<f64>,
    /// Seed of the arena's random source.
    #[arg(long)]
    seed: Option<u64>,
    /// Zero the weak robot population after every tick.
    #[arg(long)]
    reset_weak_population: bool,
    /// Regular robots to spawn.
    #[arg(long)]
    normal: Option<u32>,
    /// Weak robots to spawn.
    #[arg(long)]
    weak: Option<u32>,
    /// Avoider robots to spawn.
    #[arg(long)]
    avoider: Option<u32>,
    /// Beam robots to spawn.
    #[arg(long)]
    beam: Option<u32>,
    /// Circular obstacles to spawn.
    #[arg(long)]
    circles: Option<u32>,
    /// Line obstacles to spawn.
    #[arg(long)]
    lines: Option<u32>,
    /// Ticks to simulate.
    #[arg(long)]
    ticks: Option<u64>,
    /// Simulated wall-clock time between frames, in milliseconds.
    #[arg(long)]
    tick_interval_ms: Option<u64>,
    /// Resume a world saved with --save instead of spawning a new one.
    #[arg(long, value_name = "PATH", conflicts_with = "import")]
    load: Option<PathBuf>,
    /// Resume a world from a transfer string printed by --export.
    #[arg(long, value_name = "STRING")]
    import: Option<String>,
    /// Write the final world to this file.
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
    /// Print the final world as a transfer string.
    #[arg(long)]
    export: bool,
    /// Skip the roster printout.
    #[arg(long)]
    quiet: bool,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the robot arena command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = ArenaFile::load(cli.config.as_deref())?;
    let interval = Duration::from_millis(
        cli.tick_interval_ms
            .or(file.tick_interval_ms)
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS),
    );
    ensure!(!interval.is_zero(), "tick interval must be positive");
    let ticks = cli.ticks.or(file.ticks).unwrap_or(DEFAULT_TICKS);

    let mut pending = Vec::new();
    let mut world = if let Some(path) = &cli.load {
        load(path)?
    } else if let Some(encoded) = &cli.import {
        transfer::decode(encoded).context("failed to import world")?
    } else {
        let mut world = World::new(arena_config(&cli, &file)).context("invalid arena")?;
        populate(&mut world, &cli, &file, &mut pending);
        world
    };
    let config = query::config(&world);
    info!(
        width = config.width(),
        height = config.height(),
        wall_inset = config.wall_inset(),
        seed = config.rng_seed(),
        robots = query::agent_count(&world),
        obstacles = query::obstacle_count(&world),
        "arena ready"
    );

    let mut census = Census::new();
    simulate(&mut world, &mut census, pending, interval, ticks);

    let snapshot = query::snapshot(&world);
    if !cli.quiet {
        for line in roster(&snapshot) {
            println!("{line}");
        }
    }
    let report = census.report(&snapshot);
    info!(
        robots = report.total_robots(),
        weak = query::weak_population(&world),
        destroyed = report.destroyed(),
        evasions = report.evasions(),
        tick = query::tick_index(&world),
        "simulation finished"
    );

    if let Some(path) = &cli.save {
        save(&world, path)?;
    }
    if cli.export {
        println!("{}", transfer::encode(&world).context("failed to export world")?);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn arena_config(cli: &Cli, file: &ArenaFile) -> Config {
    let defaults = Config::default();
    let mut config = Config::new(
        cli.width.or(file.width).unwrap_or(defaults.width()),
        cli.height.or(file.height).unwrap_or(defaults.height()),
    )
    .with_weak_population_reset(
        cli.reset_weak_population || file.reset_weak_population.unwrap_or(false),
    );
    if let Some(inset) = cli.wall_inset.or(file.wall_inset) {
        config = config.with_wall_inset(inset);
    }
    if let Some(seed) = cli.seed.or(file.seed) {
        config = config.with_seed(seed);
    }
    config
}

fn populate(world: &mut World, cli: &Cli, file: &ArenaFile, events: &mut Vec<Event>) {
    let population = file.population;
    let mut commands = Vec::new();
    for (shape, count) in [
        (ObstacleShape::Circle, cli.circles.or(population.circles)),
        (ObstacleShape::Line, cli.lines.or(population.lines)),
    ] {
        for _ in 0..count.unwrap_or(0) {
            commands.push(Command::SpawnObstacle {
                shape,
                placement: Placement::Random,
            });
        }
    }
    for (kind, count) in [
        (AgentKind::Normal, cli.normal.or(population.normal).unwrap_or(3)),
        (AgentKind::Weak, cli.weak.or(population.weak).unwrap_or(3)),
        (AgentKind::Avoider, cli.avoider.or(population.avoider).unwrap_or(2)),
        (AgentKind::Beam, cli.beam.or(population.beam).unwrap_or(2)),
    ] {
        for _ in 0..count {
            commands.push(Command::SpawnAgent {
                kind,
                placement: Placement::Random,
            });
        }
    }

    for command in commands {
        world::apply(world, command, events);
    }
    let rejected = events
        .iter()
        .filter(|event| matches!(event, Event::CommandRejected { .. }))
        .count();
    if rejected > 0 {
        warn!(rejected, "some entities could not be placed");
    }
}

fn simulate(
    world: &mut World,
    census: &mut Census,
    mut pending: Vec<Event>,
    interval: Duration,
    ticks: u64,
) {
    let mut cadence = Cadence::new(CadenceConfig::new(interval, MAX_TICKS_PER_FRAME));
    cadence.sync(query::is_running(world));
    world::apply(world, Command::SetRunning { running: true }, &mut pending);

    let target = query::tick_index(world).saturating_add(ticks);
    while query::tick_index(world) < target {
        census.handle(&pending);
        let mut commands = Vec::new();
        cadence.handle(&pending, interval, &mut commands);
        pending.clear();
        for command in commands {
            world::apply(world, command, &mut pending);
        }
    }

    world::apply(world, Command::SetRunning { running: false }, &mut pending);
    census.handle(&pending);
}

fn load(path: &Path) -> Result<World> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    persistence::read_from(BufReader::new(file))
        .with_context(|| format!("failed to load world from {}", path.display()))
}

fn save(world: &World, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    persistence::write_to(world, BufWriter::new(file))
        .with_context(|| format!("failed to save world to {}", path.display()))
}
