//! HTTP transport abstraction
//!
//! The resilient client only needs "send this GET, give me status, `Retry-After`
//! and body". Keeping that behind [`HttpTransport`] lets tests substitute a
//! recording fake while production uses [`ReqwestTransport`].

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use super::retry_formatter::{classify_transport_error, RetryErrorType};

/// A GET request ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Fully-formed request URL including query string
    pub url: Url,
    /// Request headers
    pub headers: Vec<(&'static str, String)>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Look up a query parameter value.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// A fully-read HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status
    pub status: StatusCode,
    /// Raw `Retry-After` header value, if any
    pub retry_after: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response with an empty body and no `Retry-After` header.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            retry_after: None,
            body: Vec::new(),
        }
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach a `Retry-After` header value.
    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }
}

/// Failure before a complete response was received
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    /// Classification used for retry messaging
    pub kind: RetryErrorType,
    /// Underlying error text
    pub message: String,
}

impl TransportError {
    /// Create a transport error.
    pub fn new(kind: RetryErrorType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(classify_transport_error(&err), err.to_string())
    }
}

/// Sends GET requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and read the whole response.
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by a pooled [`reqwest::Client`]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client))
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            retry_after,
            body,
        })
    }
}
