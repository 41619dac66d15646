//! Cursor-based pagination for Asana listing endpoints
//!
//! Every listing (`/workspaces`, `/users`, `/projects`, ...) shares the same
//! envelope and cursor protocol, so a single generic routine serves all of them:
//! - `limit` is fixed at [`PAGE_LIMIT`]
//! - `offset` echoes the previous page's `next_page.offset`, omitted on the first request
//! - an absent or empty cursor ends the listing
//!
//! Includes safety mechanisms:
//! - Maximum page count to prevent infinite loops on a misbehaving server
//! - Cancellation check between pages

use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

use super::http::ApiHttpClient;
use super::page::Page;
use super::{FetcherError, FetcherResult};
use crate::shutdown::ShutdownCoordinator;

/// Page size requested from listing endpoints
pub const PAGE_LIMIT: usize = 100;

/// Maximum number of pages fetched for one listing
pub const MAX_PAGES: usize = 10_000;

/// A listing endpoint and its fixed query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    path: String,
    query: Vec<(String, String)>,
}

impl Resource {
    /// Listing at `path` with no extra parameters
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Add a fixed query parameter sent with every page request
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// All workspaces visible to the token
    pub fn workspaces() -> Self {
        Self::new("/workspaces")
    }

    /// Users of one workspace
    pub fn users(workspace_gid: &str) -> Self {
        Self::new("/users").with_query("workspace", workspace_gid)
    }

    /// Projects of one workspace
    pub fn projects(workspace_gid: &str) -> Self {
        Self::new("/projects").with_query("workspace", workspace_gid)
    }

    /// Endpoint path relative to the API base URL
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fixed query parameters
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (index, (key, value)) in self.query.iter().enumerate() {
            let separator = if index == 0 { '?' } else { '&' };
            write!(f, "{separator}{key}={value}")?;
        }
        Ok(())
    }
}

/// Pagination helper for Asana listings
pub struct PaginationHelper;

impl PaginationHelper {
    /// Fetch every page of `resource` and concatenate the items in request order
    ///
    /// # Arguments
    /// * `http_client` - Client performing each page request with retries
    /// * `resource` - Listing to walk
    /// * `shutdown` - Checked before every page request
    ///
    /// # Errors
    /// Any page failure aborts the listing; items gathered so far are discarded.
    pub async fn fetch_all<T>(
        http_client: &ApiHttpClient,
        resource: &Resource,
        shutdown: &ShutdownCoordinator,
    ) -> FetcherResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut cursor = String::new();
        let mut pages = 0;
        let limit = PAGE_LIMIT.to_string();

        loop {
            if shutdown.is_shutdown_requested() {
                debug!(resource = %resource, pages, "Pagination abandoned due to shutdown");
                return Err(FetcherError::Cancelled);
            }

            // Safety check: prevent infinite loops
            if pages >= MAX_PAGES {
                return Err(FetcherError::TooManyPages {
                    resource: resource.to_string(),
                    max_pages: MAX_PAGES,
                });
            }

            let url = Self::page_url(http_client, resource, &limit, &cursor)?;

            debug!(
                "Fetching page {} of {} (offset={:?})",
                pages + 1,
                resource,
                cursor
            );

            let page: Page<T> = http_client.get(&url, shutdown).await?;
            pages += 1;

            let next = page.next_cursor().map(str::to_owned);
            debug!("Received {} items in page {}", page.data.len(), pages);
            items.extend(page.data);

            match next {
                Some(next) => cursor = next,
                None => break,
            }
        }

        debug!(
            "Pagination of {} completed after {} pages. Total items: {}",
            resource,
            pages,
            items.len()
        );

        Ok(items)
    }

    fn page_url(
        http_client: &ApiHttpClient,
        resource: &Resource,
        limit: &str,
        cursor: &str,
    ) -> FetcherResult<url::Url> {
        let mut params: Vec<(&str, &str)> = vec![("limit", limit)];
        params.extend(
            resource
                .query()
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );
        if !cursor.is_empty() {
            params.push(("offset", cursor));
        }

        http_client.endpoint_url(resource.path(), &params)
    }
}
