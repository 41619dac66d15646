//! Workspace snapshot collector
//!
//! One cycle lists every workspace, then for each one lists its users and
//! projects and writes them to `<out_dir>/<workspace name>/{users,projects}.json`.
//! A failing resource is logged and recorded in the [`CycleReport`]; the
//! remaining resources and workspaces are still collected.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{CollectError, Collector, CycleReport};
use crate::fetcher::{AsanaClient, Resource};
use crate::metrics::record_records_written;
use crate::output::{workspace_dir, JsonSnapshotWriter, PROJECTS_FILE, USERS_FILE};
use crate::shutdown::ShutdownCoordinator;
use crate::{Project, User, Workspace};

/// Collects users and projects of every visible workspace
pub struct WorkspaceCollector {
    client: AsanaClient,
    writer: JsonSnapshotWriter,
    out_dir: PathBuf,
}

impl WorkspaceCollector {
    /// Create a collector writing below `out_dir`
    pub fn new(client: AsanaClient, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            writer: JsonSnapshotWriter::new(),
            out_dir: out_dir.into(),
        }
    }

    /// Output root directory
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// List one resource of `workspace` and write it as `file_name`
    ///
    /// Returns the number of records written.
    async fn collect_resource<T>(
        &self,
        kind: &'static str,
        resource: Resource,
        file_name: &str,
        workspace: &Workspace,
        dir: &Path,
        shutdown: &ShutdownCoordinator,
    ) -> Result<usize, CollectError>
    where
        T: DeserializeOwned + Serialize,
    {
        if shutdown.is_shutdown_requested() {
            return Err(CollectError::Cancelled);
        }

        let items: Vec<T> = self
            .client
            .list(&resource, shutdown)
            .await
            .map_err(|source| match source {
                source if source.is_cancelled() => CollectError::Cancelled,
                source => CollectError::Listing {
                    kind,
                    workspace: workspace.name.clone(),
                    source,
                },
            })?;

        let path = self
            .writer
            .write(dir, file_name, &items)
            .map_err(|source| CollectError::Write {
                kind,
                workspace: workspace.name.clone(),
                source,
            })?;

        record_records_written(kind, items.len());
        info!(
            workspace = %workspace.name,
            count = items.len(),
            path = %path.display(),
            "Wrote {}",
            kind
        );

        Ok(items.len())
    }
}

#[async_trait]
impl Collector for WorkspaceCollector {
    async fn collect_cycle(
        &self,
        shutdown: &ShutdownCoordinator,
    ) -> Result<CycleReport, CollectError> {
        let workspaces = self
            .client
            .workspaces(shutdown)
            .await
            .map_err(|e| match e {
                e if e.is_cancelled() => CollectError::Cancelled,
                e => CollectError::Workspaces(e),
            })?;

        debug!(
            count = workspaces.len(),
            out_dir = %self.out_dir().display(),
            "Workspaces listed"
        );

        let mut report = CycleReport::default();

        for workspace in &workspaces {
            if shutdown.is_shutdown_requested() {
                return Err(CollectError::Cancelled);
            }

            let dir = workspace_dir(&self.out_dir, &workspace.name, &workspace.gid);
            let mut failed = false;

            match self
                .collect_resource::<User>(
                    "users",
                    Resource::users(&workspace.gid),
                    USERS_FILE,
                    workspace,
                    &dir,
                    shutdown,
                )
                .await
            {
                Ok(count) => report.users += count,
                Err(CollectError::Cancelled) => return Err(CollectError::Cancelled),
                Err(e) => {
                    warn!(workspace = %workspace.name, error = %e, "Resource collection failed");
                    failed = true;
                }
            }

            match self
                .collect_resource::<Project>(
                    "projects",
                    Resource::projects(&workspace.gid),
                    PROJECTS_FILE,
                    workspace,
                    &dir,
                    shutdown,
                )
                .await
            {
                Ok(count) => report.projects += count,
                Err(CollectError::Cancelled) => return Err(CollectError::Cancelled),
                Err(e) => {
                    warn!(workspace = %workspace.name, error = %e, "Resource collection failed");
                    failed = true;
                }
            }

            report.workspaces += 1;
            if failed {
                report.failed_workspaces.push(workspace.name.clone());
            }
        }

        Ok(report)
    }
}
