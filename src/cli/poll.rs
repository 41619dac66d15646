//! Poll command implementation

use clap::{ArgGroup, Parser};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::CliError;
use crate::config::Config;
use crate::fetcher::{ApiHttpClient, AsanaClient, ReqwestTransport};
use crate::metrics::init_metrics;
use crate::poller::{self, Collector, WorkspaceCollector, LONG_INTERVAL, SHORT_INTERVAL};
use crate::shutdown::SharedShutdown;

/// Asana poller CLI
#[derive(Parser, Debug)]
#[command(name = "asana-poller")]
#[command(about = "Periodically snapshot Asana users and projects as JSON", long_about = None)]
#[command(version)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["short_interval", "long_interval"])
))]
pub struct Cli {
    /// Poll every 30 seconds
    #[arg(long, alias = "short_interval")]
    pub short_interval: bool,

    /// Poll every 5 minutes
    #[arg(long, alias = "long_interval")]
    pub long_interval: bool,

    /// Serve Prometheus metrics on this address (e.g. 0.0.0.0:9090)
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}

impl Cli {
    /// Interval selected by the mode flag
    pub fn poll_interval(&self) -> Duration {
        if self.short_interval {
            SHORT_INTERVAL
        } else {
            LONG_INTERVAL
        }
    }

    /// Load configuration from the environment and poll until shutdown
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<(), CliError> {
        let config = Config::from_env()?;
        self.execute_with_config(config, shutdown).await
    }

    /// Poll with an explicit configuration until shutdown
    ///
    /// Spawns the poll loop as a background task, waits for shutdown, then
    /// waits for the loop to observe it and exit.
    pub async fn execute_with_config(
        &self,
        config: Config,
        shutdown: SharedShutdown,
    ) -> Result<(), CliError> {
        if let Some(addr) = self.metrics_addr {
            init_metrics(addr).await?;
        }

        let interval = self.poll_interval();
        info!(
            config = ?config,
            interval_secs = interval.as_secs(),
            "Starting poller"
        );

        let transport =
            ReqwestTransport::new(config.http_timeout).map_err(CliError::HttpClientError)?;
        let http_client =
            ApiHttpClient::new(Arc::new(transport), &config.base_url, config.access_token)?;
        let collector = WorkspaceCollector::new(AsanaClient::new(http_client), config.output_dir);

        run_until_shutdown(interval, collector, shutdown).await
    }
}

/// Run `collector` on a background task until shutdown, then wait for it
///
/// A poll task that dies early (panic or abort) is reported at once as
/// [`CliError::TaskFailed`] instead of waiting for a signal.
pub async fn run_until_shutdown<C>(
    interval: Duration,
    collector: C,
    shutdown: SharedShutdown,
) -> Result<(), CliError>
where
    C: Collector + 'static,
{
    let mut task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { poller::run(interval, &collector, &shutdown).await }
    });

    let reason = tokio::select! {
        joined = &mut task => joined?,
        _ = shutdown.wait_for_shutdown() => {
            info!("Waiting for the in-flight cycle to stop");
            task.await?
        }
    };

    info!(reason = %reason, "stopped");
    Ok(())
}
