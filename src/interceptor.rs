//! Request interceptor: network-first with cache fallback
//!
//! Every fetchable GET request flows through `RequestInterceptor::handle`:
//! try the network, write good responses back to the runtime generation
//! in the background, and when the transport fails fall back to the
//! runtime cache, then the precached shell document (HTML navigations
//! only), then a synthetic 503.
//!
//! # Design
//!
//! `handle` returns a structured outcome instead of writing anywhere:
//! the caller (host glue) turns it into a real response. Failures are
//! recovered where they occur; the interceptor never returns an error,
//! so no fetch event can abort with an unhandled failure.

use std::sync::Arc;

use crate::cache::{CacheStorage, Generation, RequestKey, StoredResponse};
use crate::config::{AgentConfig, SHELL_DOCUMENT};
use crate::fetch::{Fetch, FetchRequest};
use crate::metrics::Metrics;

// ============================================================================
// Result Types
// ============================================================================

/// Which path produced the served response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeSource {
    /// Live network response (ok or error status alike)
    Network,
    /// Runtime cache hit after a transport failure
    Cache,
    /// Precached shell document substituted for an HTML navigation
    ShellFallback,
    /// Synthesized 503: no connectivity and no offline copy
    SyntheticError,
}

impl std::fmt::Display for ServeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServeSource::Network => write!(f, "network"),
            ServeSource::Cache => write!(f, "cache"),
            ServeSource::ShellFallback => write!(f, "shell_fallback"),
            ServeSource::SyntheticError => write!(f, "synthetic_error"),
        }
    }
}

/// Result of intercepting one request
#[derive(Debug)]
pub enum InterceptOutcome {
    /// Not intercepted (non-GET): the environment's default handling
    /// proceeds untouched
    Passthrough,
    /// A response was computed for the caller
    Served {
        response: StoredResponse,
        source: ServeSource,
    },
}

impl InterceptOutcome {
    /// The served response, if any
    pub fn response(&self) -> Option<&StoredResponse> {
        match self {
            InterceptOutcome::Served { response, .. } => Some(response),
            InterceptOutcome::Passthrough => None,
        }
    }

    /// The path that served the response, if any
    pub fn source(&self) -> Option<ServeSource> {
        match self {
            InterceptOutcome::Served { source, .. } => Some(*source),
            InterceptOutcome::Passthrough => None,
        }
    }
}

// ============================================================================
// Interceptor
// ============================================================================

/// Per-request policy engine
pub struct RequestInterceptor {
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetch>,
    config: AgentConfig,
    metrics: Arc<Metrics>,
}

impl RequestInterceptor {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetch>,
        config: AgentConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            storage,
            fetcher,
            config,
            metrics,
        }
    }

    /// Intercept one request and decide what serves it.
    pub async fn handle(&self, request: &FetchRequest) -> InterceptOutcome {
        // Only GET is intercepted; anything else keeps the environment's
        // default handling and touches no cache.
        if request.method != http::Method::GET {
            self.metrics.record_passthrough();
            return InterceptOutcome::Passthrough;
        }

        self.metrics.record_request();
        let key = request.key();

        // A storage fault here must not kill the request: continue without
        // a runtime generation and rely on the network attempt.
        let runtime = match self.storage.open(&self.config.runtime_name).await {
            Ok(generation) => Some(generation),
            Err(err) => {
                tracing::warn!(error = %err, "failed to open runtime generation");
                None
            }
        };

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    if let Some(generation) = &runtime {
                        self.spawn_runtime_write(
                            Arc::clone(generation),
                            key,
                            response.clone(),
                        );
                    }
                } else {
                    tracing::debug!(
                        url = %request.url,
                        status = response.status,
                        "non-ok network response served without caching"
                    );
                }
                self.metrics.record_network_served();
                InterceptOutcome::Served {
                    response,
                    source: ServeSource::Network,
                }
            }
            Err(err) => {
                tracing::debug!(
                    url = %request.url,
                    error = %err,
                    "network fetch failed, falling back to cache"
                );
                self.serve_fallback(request, &key, runtime).await
            }
        }
    }

    /// The offline fallback chain: runtime cache, then the precached
    /// shell document for HTML navigations, then a synthetic 503.
    async fn serve_fallback(
        &self,
        request: &FetchRequest,
        key: &RequestKey,
        runtime: Option<Arc<dyn Generation>>,
    ) -> InterceptOutcome {
        if let Some(generation) = &runtime {
            match generation.lookup(key).await {
                Ok(Some(cached)) => {
                    self.metrics.record_cache_served();
                    tracing::debug!(key = %key, "served from runtime cache");
                    return InterceptOutcome::Served {
                        response: cached,
                        source: ServeSource::Cache,
                    };
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "runtime cache lookup failed");
                }
            }
        }

        if request.accepts_html() {
            if let Some(shell) = self.lookup_shell().await {
                self.metrics.record_shell_fallback();
                tracing::debug!(url = %request.url, "served precached shell document");
                return InterceptOutcome::Served {
                    response: shell,
                    source: ServeSource::ShellFallback,
                };
            }
        }

        // No connectivity and no offline copy: an explicit signal the page
        // can distinguish from arbitrary network errors.
        self.metrics.record_synthetic_error();
        tracing::debug!(url = %request.url, "no offline copy available, serving 503");
        InterceptOutcome::Served {
            response: StoredResponse::service_unavailable(),
            source: ServeSource::SyntheticError,
        }
    }

    /// Best-effort lookup of the precached shell document. Misses when the
    /// shell was never successfully precached; lookup faults count as
    /// misses too.
    async fn lookup_shell(&self) -> Option<StoredResponse> {
        let precache = match self.storage.open(&self.config.precache_name).await {
            Ok(generation) => generation,
            Err(err) => {
                tracing::warn!(error = %err, "failed to open precache generation");
                return None;
            }
        };

        match precache.lookup(&RequestKey::get(SHELL_DOCUMENT)).await {
            Ok(hit) => hit,
            Err(err) => {
                tracing::warn!(error = %err, "shell document lookup failed");
                None
            }
        }
    }

    /// Write the response copy into the runtime generation without holding
    /// up the response path. The spawned task is supervised only by its
    /// failure log and counter.
    fn spawn_runtime_write(
        &self,
        generation: Arc<dyn Generation>,
        key: RequestKey,
        response: StoredResponse,
    ) {
        let metrics = Arc::clone(&self.metrics);
        tokio::spawn(async move {
            if let Err(err) = generation.put(key.clone(), response).await {
                metrics.record_runtime_write_failure();
                tracing::warn!(key = %key, error = %err, "background runtime cache write failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use http::Method;

    use crate::cache::MemoryCacheStorage;
    use crate::fetch::FetchError;

    struct MockFetcher {
        responses: HashMap<String, StoredResponse>,
        calls: AtomicU64,
    }

    impl MockFetcher {
        fn offline() -> Self {
            Self {
                responses: HashMap::new(),
                calls: AtomicU64::new(0),
            }
        }

        fn respond(mut self, url: &str, response: StoredResponse) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }

        fn call_count(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl Fetch for MockFetcher {
        async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.responses
                .get(&request.url)
                .cloned()
                .ok_or_else(|| FetchError::Transport("network unreachable".to_string()))
        }
    }

    fn ok_response(body: &str) -> StoredResponse {
        StoredResponse::new(200, vec![], Bytes::from(body.to_string()))
    }

    fn interceptor(
        storage: Arc<MemoryCacheStorage>,
        fetcher: Arc<MockFetcher>,
    ) -> RequestInterceptor {
        RequestInterceptor::new(
            storage,
            fetcher,
            AgentConfig::default(),
            Arc::new(Metrics::new()),
        )
    }

    /// The runtime write is fire-and-forget; poll until it lands.
    async fn wait_for_entry(
        generation: &Arc<dyn Generation>,
        key: &RequestKey,
    ) -> StoredResponse {
        for _ in 0..100 {
            if let Some(response) = generation.lookup(key).await.unwrap() {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("entry for '{}' never appeared in runtime cache", key);
    }

    #[tokio::test]
    async fn test_non_get_requests_pass_through_untouched() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let fetcher = Arc::new(MockFetcher::offline());
        let interceptor = interceptor(Arc::clone(&storage), Arc::clone(&fetcher));

        let request = FetchRequest {
            method: Method::POST,
            url: "/api/submit".to_string(),
            headers: vec![],
        };
        let outcome = interceptor.handle(&request).await;

        assert!(matches!(outcome, InterceptOutcome::Passthrough));
        // no network attempt and no cache activity
        assert_eq!(fetcher.call_count(), 0);
        assert!(storage.names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ok_network_response_is_served_and_written_through() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let fetcher = Arc::new(
            MockFetcher::offline().respond(
                "/data.json",
                StoredResponse::new(
                    200,
                    vec![("content-type".to_string(), "application/json".to_string())],
                    Bytes::from("{\"v\":1}"),
                ),
            ),
        );
        let interceptor = interceptor(Arc::clone(&storage), fetcher);

        let request = FetchRequest::get("/data.json");
        let outcome = interceptor.handle(&request).await;

        assert_eq!(outcome.source(), Some(ServeSource::Network));
        let served = outcome.response().unwrap();
        assert_eq!(served.status, 200);
        assert_eq!(served.body, Bytes::from("{\"v\":1}"));

        let runtime = storage.open("runtime-cache-v1").await.unwrap();
        let cached = wait_for_entry(&runtime, &request.key()).await;
        assert_eq!(cached, *served);
    }

    #[tokio::test]
    async fn test_non_ok_network_response_is_served_but_never_cached() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let fetcher = Arc::new(
            MockFetcher::offline()
                .respond("/missing", StoredResponse::new(404, vec![], Bytes::new())),
        );
        let interceptor = interceptor(Arc::clone(&storage), fetcher);

        let request = FetchRequest::get("/missing");
        let outcome = interceptor.handle(&request).await;

        assert_eq!(outcome.source(), Some(ServeSource::Network));
        assert_eq!(outcome.response().unwrap().status, 404);

        // give any (incorrect) background write a chance to land
        tokio::time::sleep(Duration::from_millis(50)).await;
        let runtime = storage.open("runtime-cache-v1").await.unwrap();
        assert!(runtime.lookup(&request.key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_to_runtime_cache() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let runtime = storage.open("runtime-cache-v1").await.unwrap();
        runtime
            .put(RequestKey::get("/page"), ok_response("cached copy"))
            .await
            .unwrap();

        let interceptor = interceptor(Arc::clone(&storage), Arc::new(MockFetcher::offline()));
        let outcome = interceptor.handle(&FetchRequest::get("/page")).await;

        assert_eq!(outcome.source(), Some(ServeSource::Cache));
        assert_eq!(outcome.response().unwrap().body, Bytes::from("cached copy"));
    }

    #[tokio::test]
    async fn test_cache_hit_takes_precedence_over_shell_fallback() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let precache = storage.open("prayer-times-app-v1").await.unwrap();
        precache
            .put(RequestKey::get(SHELL_DOCUMENT), ok_response("shell"))
            .await
            .unwrap();
        let runtime = storage.open("runtime-cache-v1").await.unwrap();
        runtime
            .put(RequestKey::get("/page"), ok_response("exact copy"))
            .await
            .unwrap();

        let interceptor = interceptor(Arc::clone(&storage), Arc::new(MockFetcher::offline()));
        let request = FetchRequest::get("/page").with_header("Accept", "text/html");
        let outcome = interceptor.handle(&request).await;

        assert_eq!(outcome.source(), Some(ServeSource::Cache));
        assert_eq!(outcome.response().unwrap().body, Bytes::from("exact copy"));
    }

    #[tokio::test]
    async fn test_html_navigation_miss_serves_precached_shell() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let precache = storage.open("prayer-times-app-v1").await.unwrap();
        precache
            .put(RequestKey::get(SHELL_DOCUMENT), ok_response("shell"))
            .await
            .unwrap();

        let interceptor = interceptor(Arc::clone(&storage), Arc::new(MockFetcher::offline()));
        let request = FetchRequest::get("/some/deep/route")
            .with_header("Accept", "text/html,application/xhtml+xml");
        let outcome = interceptor.handle(&request).await;

        assert_eq!(outcome.source(), Some(ServeSource::ShellFallback));
        assert_eq!(outcome.response().unwrap().body, Bytes::from("shell"));
    }

    #[tokio::test]
    async fn test_non_html_miss_serves_synthetic_503() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let interceptor = interceptor(storage, Arc::new(MockFetcher::offline()));

        let request = FetchRequest::get("/api/x").with_header("Accept", "application/json");
        let outcome = interceptor.handle(&request).await;

        assert_eq!(outcome.source(), Some(ServeSource::SyntheticError));
        let response = outcome.response().unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.status_text, "Service Unavailable");
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_html_navigation_without_precached_shell_serves_503() {
        // the shell was never precached: the synthetic path covers the
        // miss instead of failing the request
        let storage = Arc::new(MemoryCacheStorage::new());
        let interceptor = interceptor(storage, Arc::new(MockFetcher::offline()));

        let request = FetchRequest::get("/page").with_header("Accept", "text/html");
        let outcome = interceptor.handle(&request).await;

        assert_eq!(outcome.source(), Some(ServeSource::SyntheticError));
        assert_eq!(outcome.response().unwrap().status, 503);
    }

    #[tokio::test]
    async fn test_repeat_request_overwrites_runtime_entry() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let runtime = storage.open("runtime-cache-v1").await.unwrap();
        runtime
            .put(RequestKey::get("/data.json"), ok_response("stale"))
            .await
            .unwrap();

        let fetcher =
            Arc::new(MockFetcher::offline().respond("/data.json", ok_response("fresh")));
        let interceptor = interceptor(Arc::clone(&storage), fetcher);

        let request = FetchRequest::get("/data.json");
        interceptor.handle(&request).await;

        for _ in 0..100 {
            let current = runtime.lookup(&request.key()).await.unwrap().unwrap();
            if current.body == Bytes::from("fresh") {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("runtime entry was never overwritten with the fresh copy");
    }

    #[tokio::test]
    async fn test_serve_source_display_labels() {
        assert_eq!(ServeSource::Network.to_string(), "network");
        assert_eq!(ServeSource::Cache.to_string(), "cache");
        assert_eq!(ServeSource::ShellFallback.to_string(), "shell_fallback");
        assert_eq!(ServeSource::SyntheticError.to_string(), "synthetic_error");
    }
}
