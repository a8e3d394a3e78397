//! Lifecycle manager: install and activate
//!
//! Runs once per deployment. Install populates the precache generation as
//! an all-or-nothing batch; activate sweeps stale generations. Both signal
//! the host so the new agent version takes over open pages immediately
//! instead of waiting for the old version's pages to close.

use std::sync::Arc;

use futures::future;

use crate::cache::CacheStorage;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::fetch::{Fetch, FetchRequest};
use crate::metrics::Metrics;

/// Host signals the lifecycle manager raises
///
/// The hosting runtime owns page contexts; the agent can only signal
/// intent. `skip_waiting` asks for immediate activation of the new
/// version, `claim_clients` for control of already-open pages.
pub trait HostControl: Send + Sync {
    fn skip_waiting(&self);
    fn claim_clients(&self);
}

/// No-op host control for hosts that handle takeover themselves
pub struct NullHostControl;

impl HostControl for NullHostControl {
    fn skip_waiting(&self) {}
    fn claim_clients(&self) {}
}

/// Handles the install and activate events
pub struct LifecycleManager {
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetch>,
    host: Arc<dyn HostControl>,
    config: AgentConfig,
    metrics: Arc<Metrics>,
}

impl LifecycleManager {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetch>,
        host: Arc<dyn HostControl>,
        config: AgentConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            storage,
            fetcher,
            host,
            config,
            metrics,
        }
    }

    /// Install event: populate the precache generation.
    ///
    /// A failed batch degrades offline capability but must not block
    /// installation, so the failure is logged and swallowed: the
    /// surrounding UI has no way to react to it.
    pub async fn install(&self) -> Result<(), AgentError> {
        tracing::info!(generation = %self.config.precache_name, "installing agent");

        // Request immediate activation before the batch runs; stale pages
        // must not block rollout.
        self.host.skip_waiting();

        match self.populate_precache().await {
            Ok(count) => {
                tracing::info!(
                    entries = count,
                    generation = %self.config.precache_name,
                    "precache populated"
                );
            }
            Err(err) => {
                self.metrics.record_precache_failure();
                tracing::warn!(error = %err, "precache population failed, continuing install");
            }
        }

        Ok(())
    }

    /// Fetch and store the whole precache URL set.
    ///
    /// All fetches must succeed before any entry is committed; a single
    /// failure fails the batch with nothing written.
    async fn populate_precache(&self) -> Result<usize, AgentError> {
        let generation = self.storage.open(&self.config.precache_name).await?;
        let urls = self.config.combined_precache_urls();

        let fetches = urls.iter().map(|url| {
            let fetcher = Arc::clone(&self.fetcher);
            async move {
                let request = FetchRequest::get(url.clone());
                let response = fetcher
                    .fetch(&request)
                    .await
                    .map_err(|e| AgentError::Fetch(format!("{}: {}", url, e)))?;
                if !response.is_ok() {
                    return Err(AgentError::Fetch(format!(
                        "{}: status {}",
                        url, response.status
                    )));
                }
                Ok((request.key(), response))
            }
        });

        let snapshots = future::try_join_all(fetches).await?;
        for (key, response) in snapshots {
            generation.put(key, response).await?;
        }

        Ok(urls.len())
    }

    /// Activate event: claim open pages and sweep stale generations.
    ///
    /// Every identifier in storage that is not in the current allow-list
    /// belongs to a previous deployment and is deleted. Deletions run
    /// concurrently with no ordering guarantee; individual failures are
    /// logged and skipped, matching the precache failure policy.
    pub async fn activate(&self) -> Result<(), AgentError> {
        tracing::info!("activating agent");

        self.host.claim_clients();

        let names = self.storage.names().await?;
        let allow = self.config.allow_list();
        let stale: Vec<String> = names
            .into_iter()
            .filter(|name| !allow.contains(&name.as_str()))
            .collect();

        let deletions = stale.iter().map(|name| {
            let storage = Arc::clone(&self.storage);
            async move {
                match storage.delete(name).await {
                    Ok(true) => {
                        self.metrics.record_stale_generation_swept();
                        tracing::info!(generation = %name, "deleted stale cache generation");
                    }
                    Ok(false) => {}
                    Err(err) => {
                        tracing::warn!(
                            generation = %name,
                            error = %err,
                            "failed to delete stale cache generation"
                        );
                    }
                }
            }
        });
        future::join_all(deletions).await;

        Ok(())
    }
}
