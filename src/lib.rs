//! # Asana Poller Library
//!
//! Periodically mirrors the workspaces, users and projects visible to an Asana
//! personal access token into indented JSON snapshots on disk.
//!
//! ## Features
//!
//! - **Resilient fetching**: bounded retries with exponential backoff (1s doubling to 32s)
//! - **Rate-limit aware**: honors `Retry-After` hints on HTTP 429 responses
//! - **Cursor pagination**: one generic paginator for every listing endpoint
//! - **Cooperative cancellation**: SIGINT/SIGTERM interrupt sleeps and in-flight
//!   requests at well-defined points
//! - **Failure containment**: a failed collection cycle is logged, the loop keeps running
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use asana_poller::fetcher::{ApiHttpClient, AsanaClient, ReqwestTransport};
//! use asana_poller::poller::{self, WorkspaceCollector};
//! use asana_poller::shutdown::ShutdownCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::new(Duration::from_secs(30))?;
//! let http = ApiHttpClient::new(
//!     Arc::new(transport),
//!     "https://app.asana.com/api/1.0",
//!     "my-personal-access-token",
//! )?;
//! let collector = WorkspaceCollector::new(AsanaClient::new(http), "out");
//!
//! let shutdown = ShutdownCoordinator::shared();
//! let reason = poller::run(Duration::from_secs(30), &collector, &shutdown).await;
//! println!("poll loop stopped: {reason}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - HTTP transport, retry/backoff and cursor pagination
//! - [`poller`] - Fixed-interval poll loop and the workspace collection cycle
//! - [`output`] - Directory naming and atomic JSON snapshot writing
//! - [`config`] - Environment-driven configuration
//! - [`shutdown`] - Cancellation shared by every blocking operation
//! - [`metrics`] - Request, retry and cycle metrics
//! - [`cli`] - Command-line entry point

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// CLI command implementations
pub mod cli;

/// Environment configuration
pub mod config;

/// HTTP fetching, retry and pagination
pub mod fetcher;

/// Observability metrics
pub mod metrics;

/// Snapshot output writers
pub mod output;

/// Poll loop and collection cycle
pub mod poller;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

pub use config::Config;
pub use shutdown::{SharedShutdown, ShutdownCoordinator};

/// An Asana workspace or organization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    /// Globally unique identifier
    pub gid: String,
    /// Display name
    pub name: String,
}

/// A user belonging to a workspace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Globally unique identifier
    pub gid: String,
    /// Display name
    pub name: String,
    /// Email address, only present when the token may see it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Compact workspace reference embedded in other resources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceRef {
    /// Globally unique identifier
    pub gid: String,
    /// Display name
    #[serde(default)]
    pub name: String,
}

/// A project inside a workspace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// Globally unique identifier
    pub gid: String,
    /// Display name
    pub name: String,
    /// Whether the project is archived
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,
    /// Color label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Creation timestamp as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last modification timestamp as reported by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    /// Owning workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceRef>,
}

fn is_false(value: &bool) -> bool {
    !*value
}
