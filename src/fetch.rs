//! Network fetch seam
//!
//! The interceptor and lifecycle manager never talk to the network
//! directly; they go through the `Fetch` trait so tests can script
//! responses and transport failures. `HttpFetcher` is the real
//! implementation over reqwest.

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use thiserror::Error;

use crate::cache::{RequestKey, StoredResponse};

/// Errors from the network attempt
///
/// `Transport` is the recoverable class: offline, DNS failure, connection
/// reset. The interceptor falls back to the cache on it. `InvalidRequest`
/// means the request could never be issued and is not retried.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// An outgoing request as seen by the interceptor
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// HTTP method
    pub method: Method,
    /// Request URL (may be a relative shell path like "./index.html")
    pub url: String,
    /// Request headers as declared by the page
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// Build a plain GET request with no headers
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Attach a header, builder-style
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup, first match wins
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the declared Accept header indicates an HTML document.
    /// Drives the shell-fallback path for navigations while offline.
    pub fn accepts_html(&self) -> bool {
        self.header("accept")
            .map(|accept| accept.contains("text/html"))
            .unwrap_or(false)
    }

    /// The cache identity of this request
    pub fn key(&self) -> RequestKey {
        RequestKey {
            method: self.method.clone(),
            url: self.url.clone(),
        }
    }
}

/// Network fetch seam
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Issue the request over the network and snapshot the response.
    /// A response is returned for any HTTP status; `Err` means the
    /// transport itself failed.
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, FetchError>;
}

/// Real fetcher over reqwest
///
/// Relative shell paths ("./", "./index.html") are resolved against the
/// host origin supplied at construction; absolute URLs pass through.
pub struct HttpFetcher {
    client: reqwest::Client,
    origin: String,
}

impl HttpFetcher {
    /// Create a fetcher resolving relative paths against `origin`
    /// (e.g. "https://app.example.com")
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            let path = url.trim_start_matches('.');
            let path = path.strip_prefix('/').unwrap_or(path);
            format!("{}/{}", self.origin, path)
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, FetchError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;

        let mut builder = self.client.request(method, self.resolve(&request.url));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                FetchError::InvalidRequest(e.to_string())
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body: Bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(StoredResponse::new(status, headers, body))
    }
}
