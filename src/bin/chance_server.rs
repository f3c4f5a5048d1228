use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use chance_server::config::{AppConfig, CONFIG_PATH};
use chance_server::handler::RoundHandler;
use chance_server::rng::ThreadRngDraw;
use chance_server::server::Server;

#[derive(Parser)]
#[command(name = "chance-server", about = "WebSocket chance game server")]
struct Args {
    /// Path to the TOML config file (defaults apply if it is missing)
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Address to listen on, overriding the config file
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load_or_default(&args.config)?;
    if args.config.exists() {
        info!("Loaded config from {}", args.config.display());
    } else {
        warn!("{} not found, using defaults", args.config.display());
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if !config.server.path.starts_with('/') {
        anyhow::bail!("server.path must start with '/', got {:?}", config.server.path);
    }

    let server = Server::bind(&config.server, RoundHandler::new(ThreadRngDraw)).await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
