use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use decacal_core::DecacalConfig;
use decacal_server::{AppState, app, logging, singleton};
use tracing::info;

#[derive(Parser)]
#[command(name = "decacal-server")]
#[command(about = "Serve the decacal REST API from a local event store")]
struct Args {
    /// Config file (defaults to ~/.config/decacal/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the configured data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Increase log output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut config = match &args.config {
        Some(path) => DecacalConfig::load_from(path)?,
        None => DecacalConfig::load()?,
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Ensure only one instance owns the data directory
    let _lock = singleton::acquire_lock(&config.data_path())?;

    let state = AppState::from_config(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.host))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, data_dir = %config.data_path().display(), "decacal-server listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
