//! Request identity and stored response types
//!
//! This module defines the two core cache value types:
//! - `RequestKey`: identity of a cached request (method + URL)
//! - `StoredResponse`: immutable snapshot of a response at caching time

use bytes::Bytes;
use http::Method;

/// Identity of a cached request
///
/// Interception is effectively GET-only, but the method is part of the
/// identity so a generation never conflates a GET with anything else.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RequestKey {
    /// HTTP method (GET in practice)
    pub method: Method,
    /// Request URL as issued by the page (may be a relative shell path)
    pub url: String,
}

impl RequestKey {
    /// Build a GET key for a URL
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
        }
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Immutable snapshot of a network response at the time it was cached
///
/// No expiry metadata is tracked: an entry lives until its whole
/// generation is swept.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase ("OK", "Service Unavailable", ...)
    pub status_text: String,
    /// Response headers as received
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Bytes,
}

impl StoredResponse {
    /// Create a snapshot with the canonical reason phrase for the status
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
            .to_string();
        Self {
            status,
            status_text,
            headers,
            body,
        }
    }

    /// The synthetic failure response returned when no connectivity and no
    /// offline copy exist: 503, "Service Unavailable", empty body.
    pub fn service_unavailable() -> Self {
        Self {
            status: 503,
            status_text: "Service Unavailable".to_string(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Whether the response is "ok" (2xx) and therefore cacheable
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup, first match wins
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Approximate size of this snapshot in bytes (body plus header text)
    pub fn size_bytes(&self) -> usize {
        let header_size: usize = self
            .headers
            .iter()
            .map(|(n, v)| n.len() + v.len())
            .sum();
        self.body.len() + header_size + self.status_text.len()
    }
}
