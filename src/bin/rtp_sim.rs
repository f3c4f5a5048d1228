//! rtp-sim — Monte-Carlo return-to-player check for the payout formula.
//!
//! Plays rounds with a fixed bet and uniformly random chosen numbers across a
//! pool of worker threads, then prints one JSON report comparing the observed
//! RTP with the formula's analytic value.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use chance_server::config::{AppConfig, CONFIG_PATH};
use chance_server::reporter;
use chance_server::rtp::{SimulationParams, simulate};

#[derive(Parser)]
#[command(name = "rtp-sim", about = "Simulate rounds and report the return-to-player")]
struct Args {
    /// Number of rounds to play (default from config)
    #[arg(long)]
    rounds: Option<u64>,

    /// Worker threads (default from config)
    #[arg(long)]
    workers: Option<usize>,

    /// Bet per round (default from config)
    #[arg(long)]
    bet: Option<f64>,

    /// Base seed; each worker derives its own stream from it
    #[arg(long)]
    seed: Option<u64>,

    /// Path to the TOML config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = AppConfig::load_or_default(&args.config)?.simulation;

    let params = SimulationParams {
        rounds: args.rounds.unwrap_or(config.rounds),
        workers: args.workers.unwrap_or(config.workers),
        bet: args.bet.unwrap_or(config.bet),
        seed: args.seed.unwrap_or_else(rand::random),
    };
    info!(
        "Simulating {} rounds on {} workers (bet={} seed={})",
        params.rounds, params.workers, params.bet, params.seed
    );

    let started = Instant::now();
    let report = simulate(params)?;
    info!(
        "Done in {:.2}s: RTP {:.4} (expected {:.4})",
        started.elapsed().as_secs_f64(),
        report.rtp,
        report.expected_rtp
    );

    reporter::report_rtp(&report);
    Ok(())
}
