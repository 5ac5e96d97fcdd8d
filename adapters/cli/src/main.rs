#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Road Defence session.

mod autoplay;
mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use road_defence_world::World;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "road-defence")]
#[command(about = "Plays a headless Road Defence session with a scripted player")]
struct Args {
    /// TOML file overriding the default session configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for card draws and combat rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds after which the session is abandoned
    #[arg(long, default_value_t = 900)]
    max_seconds: u64,
}

/// Entry point for the Road Defence command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut config = config::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    info!(
        columns = config.columns,
        rows = config.rows,
        final_wave = config.final_wave,
        seed = config.rng_seed,
        "starting session"
    );

    let mut world = World::new(config).context("failed to create world")?;
    let report = autoplay::run(&mut world, Duration::from_secs(args.max_seconds));

    match report.summary {
        Some(summary) => {
            println!("Outcome: {:?}", summary.outcome);
            println!("Waves cleared: {}", summary.wave_reached);
            println!("Towers standing: {}", summary.towers);
            println!("Gold left: {}", summary.gold);
        }
        None => println!("Outcome: abandoned after {} simulated seconds", args.max_seconds),
    }
    println!("Waves started: {}", report.waves);
    println!("Enemies killed: {}", report.kills);
    println!("Enemies escaped: {}", report.escapes);
    println!("Upgrades bought: {}", report.upgrades);
    println!("Steps simulated: {}", report.steps);
    Ok(())
}
