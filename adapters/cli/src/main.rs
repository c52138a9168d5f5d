#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless arena run.

mod config;
mod simulation;

use std::path::PathBuf;

use anyhow::{ensure, Result};
use arena_director::ArenaDirector;
use clap::Parser;

use crate::{config::SimulationConfig, simulation::Options};

/// Plays a seeded arena run where one enemy falls every tick.
#[derive(Debug, Parser)]
#[command(name = "arena-director", version)]
struct Cli {
    /// Seed for the arena layout and the order enemies are defeated in.
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// TOML file with run, layout, catalog, and bestiary settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the number of waves in the run.
    #[arg(long)]
    waves: Option<u32>,
    /// Overrides the delay between waves, in seconds.
    #[arg(long)]
    transition_delay: Option<f32>,
    /// Starts each wave from the command line instead of the director's countdown.
    #[arg(long)]
    manual: bool,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 100)]
    tick_ms: u32,
    /// Ticks to simulate before abandoning the run.
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    ensure!(cli.tick_ms > 0, "--tick-ms must be positive");

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(waves) = cli.waves {
        config.run.total_waves = waves;
    }
    if let Some(delay) = cli.transition_delay {
        config.run.transition_delay = delay;
    }
    if cli.manual {
        config.run.auto_progress = false;
    }

    let (director_config, bestiary) = config.into_parts();
    let mut director = ArenaDirector::new(director_config, bestiary);
    let options = Options {
        seed: cli.seed,
        tick_seconds: cli.tick_ms as f32 / 1000.0,
        max_ticks: cli.max_ticks,
        manual: cli.manual,
    };
    let outcome = simulation::run(&mut director, &options)?;

    if let Some(layout) = director.layout() {
        let report = layout.report();
        println!(
            "arena `{}` (seed {}): {}/{} cover, {}/{} spawn points",
            layout.template().name(),
            layout.seed(),
            report.placed_cover,
            report.requested_cover,
            report.placed_spawn_points,
            report.requested_spawn_points,
        );
    }
    println!(
        "{} after {} ticks: {} waves cleared, {} enemies defeated",
        if outcome.run_completed {
            "run completed"
        } else {
            "run abandoned"
        },
        outcome.ticks,
        outcome.waves_cleared,
        outcome.enemies_defeated,
    );
    for (kind, amount) in &outcome.inventory {
        println!("  {kind}: {amount}");
    }
    if outcome.forfeited > 0 {
        println!("  forfeited {} loot", outcome.forfeited);
    }
    Ok(())
}
