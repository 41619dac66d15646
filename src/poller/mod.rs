//! Fixed-interval poll loop
//!
//! The loop runs one collection cycle immediately, then one per interval tick
//! until shutdown is requested. A failed cycle is logged and the loop keeps
//! going; only a shutdown request ends it.
//!
//! # Example
//!
//! ```no_run
//! use asana_poller::poller::{self, Collector, CollectError, CycleReport};
//! use asana_poller::ShutdownCoordinator;
//! use async_trait::async_trait;
//! use std::time::Duration;
//!
//! struct Noop;
//!
//! #[async_trait]
//! impl Collector for Noop {
//!     async fn collect_cycle(
//!         &self,
//!         _shutdown: &ShutdownCoordinator,
//!     ) -> Result<CycleReport, CollectError> {
//!         Ok(CycleReport::default())
//!     }
//! }
//!
//! # async fn example() {
//! let shutdown = ShutdownCoordinator::shared();
//! let reason = poller::run(Duration::from_secs(30), &Noop, &shutdown).await;
//! println!("poll loop stopped: {reason}");
//! # }
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::fetcher::FetcherError;
use crate::metrics::CycleMetrics;
use crate::output::OutputError;
use crate::shutdown::ShutdownCoordinator;

pub mod collector;

pub use collector::WorkspaceCollector;

/// Interval selected by `--short-interval`
pub const SHORT_INTERVAL: Duration = Duration::from_secs(30);

/// Interval selected by `--long-interval`
pub const LONG_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Summary of one completed collection cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Workspaces visited
    pub workspaces: usize,
    /// Users written across all workspaces
    pub users: usize,
    /// Projects written across all workspaces
    pub projects: usize,
    /// Names of workspaces with at least one failed resource
    pub failed_workspaces: Vec<String>,
}

/// Errors ending a collection cycle early
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The workspace listing itself failed
    #[error("listing workspaces: {0}")]
    Workspaces(#[source] FetcherError),

    /// A per-workspace listing failed
    #[error("listing {kind} of workspace {workspace}: {source}")]
    Listing {
        /// Resource kind ("users", "projects")
        kind: &'static str,
        /// Workspace name
        workspace: String,
        /// Underlying error
        #[source]
        source: FetcherError,
    },

    /// A snapshot could not be written
    #[error("writing {kind} of workspace {workspace}: {source}")]
    Write {
        /// Resource kind ("users", "projects")
        kind: &'static str,
        /// Workspace name
        workspace: String,
        /// Underlying error
        #[source]
        source: OutputError,
    },

    /// Shutdown was requested mid-cycle
    #[error("collection cancelled by shutdown")]
    Cancelled,
}

/// Reason the poll loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// Shutdown was requested
    #[error("poll loop cancelled by shutdown")]
    Cancelled,
}

/// One full collection pass driven by the poll loop
#[async_trait]
pub trait Collector: Send + Sync {
    /// Run one cycle, checking `shutdown` between blocking calls
    async fn collect_cycle(&self, shutdown: &ShutdownCoordinator)
        -> Result<CycleReport, CollectError>;
}

/// Run `collector` every `interval` until shutdown is requested
///
/// The first cycle starts immediately. Ticks missed while a slow cycle runs
/// are skipped rather than replayed. Never starts a cycle once shutdown has
/// been requested.
///
/// # Returns
/// The terminal reason, always [`PollError::Cancelled`]
pub async fn run<C>(interval: Duration, collector: &C, shutdown: &ShutdownCoordinator) -> PollError
where
    C: Collector + ?Sized,
{
    // tokio rejects a zero period
    let period = interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut cycle: u64 = 0;

    info!(interval_secs = period.as_secs(), "Poll loop started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait_for_shutdown() => {
                info!(cycles = cycle, "Poll loop stopping");
                return PollError::Cancelled;
            }
            _ = ticker.tick() => {}
        }

        cycle += 1;
        let metrics = CycleMetrics::start(cycle);

        match collector.collect_cycle(shutdown).await {
            Ok(report) => {
                metrics.record_success(report.workspaces, report.failed_workspaces.len());
                debug!(
                    cycle,
                    users = report.users,
                    projects = report.projects,
                    "Cycle totals"
                );
            }
            Err(CollectError::Cancelled) => {
                metrics.record_cancelled();
                return PollError::Cancelled;
            }
            Err(e) => metrics.record_failure(&e.to_string()),
        }

        info!(
            cycle,
            took_ms = metrics.elapsed().as_millis(),
            interval_secs = period.as_secs(),
            "Cycle finished, waiting for next tick"
        );
    }
}
