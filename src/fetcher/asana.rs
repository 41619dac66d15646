//! Typed Asana listings built on the generic paginator

use tracing::debug;

use super::http::ApiHttpClient;
use super::pagination::{PaginationHelper, Resource};
use super::FetcherResult;
use crate::shutdown::ShutdownCoordinator;
use crate::{Project, User, Workspace};

/// Asana API client exposing the listings the collector needs
pub struct AsanaClient {
    http_client: ApiHttpClient,
}

impl AsanaClient {
    /// Wrap a configured HTTP client
    pub fn new(http_client: ApiHttpClient) -> Self {
        Self { http_client }
    }

    /// Underlying HTTP client
    pub fn http_client(&self) -> &ApiHttpClient {
        &self.http_client
    }

    /// List every workspace visible to the token
    pub async fn workspaces(
        &self,
        shutdown: &ShutdownCoordinator,
    ) -> FetcherResult<Vec<Workspace>> {
        self.list(&Resource::workspaces(), shutdown).await
    }

    /// List the users of a workspace
    pub async fn users(
        &self,
        workspace_gid: &str,
        shutdown: &ShutdownCoordinator,
    ) -> FetcherResult<Vec<User>> {
        self.list(&Resource::users(workspace_gid), shutdown).await
    }

    /// List the projects of a workspace
    pub async fn projects(
        &self,
        workspace_gid: &str,
        shutdown: &ShutdownCoordinator,
    ) -> FetcherResult<Vec<Project>> {
        self.list(&Resource::projects(workspace_gid), shutdown).await
    }

    /// List any resource, decoding items as `T`
    pub async fn list<T>(
        &self,
        resource: &Resource,
        shutdown: &ShutdownCoordinator,
    ) -> FetcherResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let items = PaginationHelper::fetch_all(&self.http_client, resource, shutdown).await?;
        debug!(resource = %resource, count = items.len(), "Listing fetched");
        Ok(items)
    }
}
