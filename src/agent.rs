//! Agent composition
//!
//! `OfflineAgent` wires the lifecycle manager and the request interceptor
//! over one shared storage/fetcher pair and exposes the three
//! event-shaped entry points the host delivers: install, activate, fetch.

use std::sync::Arc;

use crate::cache::CacheStorage;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::fetch::{Fetch, FetchRequest};
use crate::interceptor::{InterceptOutcome, RequestInterceptor};
use crate::lifecycle::{HostControl, LifecycleManager, NullHostControl};
use crate::metrics::Metrics;

/// The offline caching agent
///
/// One instance lives for the lifetime of a deployment generation. The
/// host calls `install` once when the version is first loaded, `activate`
/// once when it takes control, and `handle_fetch` for every outgoing
/// request it wants intercepted.
pub struct OfflineAgent {
    lifecycle: LifecycleManager,
    interceptor: RequestInterceptor,
    metrics: Arc<Metrics>,
}

impl OfflineAgent {
    /// Create an agent over injected storage, fetcher and host control.
    /// Fails if the configuration is invalid.
    pub fn new(
        config: AgentConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetch>,
        host: Arc<dyn HostControl>,
    ) -> Result<Self, AgentError> {
        config.validate().map_err(AgentError::Config)?;

        let metrics = Arc::new(Metrics::new());
        let lifecycle = LifecycleManager::new(
            Arc::clone(&storage),
            Arc::clone(&fetcher),
            host,
            config.clone(),
            Arc::clone(&metrics),
        );
        let interceptor =
            RequestInterceptor::new(storage, fetcher, config, Arc::clone(&metrics));

        Ok(Self {
            lifecycle,
            interceptor,
            metrics,
        })
    }

    /// Create an agent with no host-control signals wired up
    pub fn with_null_host(
        config: AgentConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetch>,
    ) -> Result<Self, AgentError> {
        Self::new(config, storage, fetcher, Arc::new(NullHostControl))
    }

    /// Install event
    pub async fn install(&self) -> Result<(), AgentError> {
        self.lifecycle.install().await
    }

    /// Activate event
    pub async fn activate(&self) -> Result<(), AgentError> {
        self.lifecycle.activate().await
    }

    /// Fetch event
    pub async fn handle_fetch(&self, request: &FetchRequest) -> InterceptOutcome {
        self.interceptor.handle(request).await
    }

    /// Shared metrics handle, e.g. for a host-side scrape endpoint
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }
}
