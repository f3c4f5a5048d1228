//! Plays rounds against a running server over WebSocket and reports the
//! observed return-to-player.
//!
//! Each round sends `"<bet>,<chosen>"` with a random chosen number in 1..=99
//! and waits for the reply before sending the next one.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use chance_server::reporter;
use chance_server::rtp::expected_rtp;
use chance_server::server::ERROR_PREFIX;
use chance_server::types::{MAX_CHOSEN, MIN_CHOSEN, RtpReport, RtpSource};
use chance_server::DEFAULT_GAME_URL;

/// How long to wait for a single reply.
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "probe_rounds", about = "Play rounds against a running chance server")]
struct Args {
    /// Game endpoint URL
    #[arg(long, default_value = DEFAULT_GAME_URL)]
    url: String,

    /// Number of rounds to play
    #[arg(long, default_value_t = 10_000)]
    rounds: u64,

    /// Bet per round
    #[arg(long, default_value_t = 1.0)]
    bet: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.bet <= 0.0 {
        bail!("--bet must be positive");
    }

    let (ws, _) = connect_async(args.url.as_str())
        .await
        .with_context(|| format!("failed to connect to {}", args.url))?;
    let (mut write, mut read) = ws.split();
    info!("Connected to {}", args.url);

    let mut rng = rand::thread_rng();
    let mut staked = 0.0;
    let mut payout = 0.0;
    let mut played = 0u64;
    let mut rejected = 0u64;
    let started = Instant::now();

    for round in 0..args.rounds {
        let chosen = rng.gen_range(MIN_CHOSEN..=MAX_CHOSEN);
        let request = format!("{:.2},{chosen}", args.bet);
        write.send(Message::Text(request.into())).await?;

        let reply = loop {
            match tokio::time::timeout(REPLY_TIMEOUT, read.next()).await {
                Ok(Some(Ok(Message::Text(text)))) => break text.to_string(),
                Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {
                    bail!("server closed the connection after {round} rounds")
                }
                Ok(Some(Ok(_))) => continue, // ping, pong, etc.
                Ok(Some(Err(e))) => return Err(e.into()),
                Err(_) => bail!("no reply within {REPLY_TIMEOUT:?} on round {round}"),
            }
        };

        if let Some(reason) = reply.strip_prefix(ERROR_PREFIX) {
            warn!("Round {round} rejected: {reason}");
            rejected += 1;
            continue;
        }
        let win: f64 = reply
            .parse()
            .with_context(|| format!("unexpected reply {reply:?}"))?;
        staked += args.bet;
        payout += win;
        played += 1;
    }

    let _ = write.send(Message::Close(None)).await;
    info!(
        "Played {played} rounds in {:.1}s",
        started.elapsed().as_secs_f64()
    );

    let report = RtpReport {
        timestamp: chrono::Utc::now().to_rfc3339(),
        source: RtpSource::Probe,
        rounds: played,
        workers: 1,
        bet: args.bet,
        total_staked: staked,
        total_payout: payout,
        rtp: if staked > 0.0 { payout / staked } else { 0.0 },
        expected_rtp: expected_rtp(),
        rejected,
    };
    reporter::report_rtp(&report);
    Ok(())
}
