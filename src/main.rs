//! Main entry point for the asana-poller CLI

use asana_poller::cli::Cli;
use asana_poller::shutdown::{self, ShutdownCoordinator};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    // Check if JSON output is requested via environment variable
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("asana_poller=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    // Usage errors exit with code 2 from here
    let cli = Cli::parse();

    let shutdown = ShutdownCoordinator::shared();
    tokio::spawn(shutdown::listen_for_signals(shutdown.clone()));

    let result = cli
        .execute(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!(e));

    if let Err(e) = result {
        error!("Poller failed: {:#}", e);
        std::process::exit(1);
    }
}
