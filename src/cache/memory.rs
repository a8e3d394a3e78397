//! In-memory cache storage implementation
//!
//! This module provides the default backing store:
//! - `MemoryCacheStorage`: registry of named generations
//! - `MemoryGeneration`: one generation backed by a HashMap
//!
//! There is no size limiting and no expiry: entries live until their
//! generation is deleted wholesale. Locks are never held across await
//! points; each read/write call is individually atomic, matching the
//! atomicity the browser's cache storage provides per call.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::entry::{RequestKey, StoredResponse};
use super::error::CacheError;
use super::stats::{CacheStats, CacheStatsTracker};
use super::traits::{CacheStorage, Generation};

/// One in-memory generation
pub struct MemoryGeneration {
    entries: RwLock<HashMap<RequestKey, StoredResponse>>,
    stats: CacheStatsTracker,
}

impl MemoryGeneration {
    /// Create an empty generation
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: CacheStatsTracker::new(),
        }
    }
}

impl Default for MemoryGeneration {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generation for MemoryGeneration {
    async fn lookup(&self, key: &RequestKey) -> Result<Option<StoredResponse>, CacheError> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(response) => {
                self.stats.increment_hits();
                Ok(Some(response.clone()))
            }
            None => {
                self.stats.increment_misses();
                Ok(None)
            }
        }
    }

    async fn put(&self, key: RequestKey, response: StoredResponse) -> Result<(), CacheError> {
        let mut entries = self.entries.write();
        entries.insert(key, response);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>, CacheError> {
        let entries = self.entries.read();
        Ok(entries.keys().cloned().collect())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        let entries = self.entries.read();
        Ok(entries.len())
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let (count, size) = {
            let entries = self.entries.read();
            let size: usize = entries.values().map(|r| r.size_bytes()).sum();
            (entries.len() as u64, size as u64)
        };
        Ok(self.stats.snapshot(count, size))
    }
}

/// Registry of in-memory generations
///
/// Cheap to clone via `Arc`; the agent and all concurrently-handled
/// requests share one registry.
pub struct MemoryCacheStorage {
    generations: RwLock<HashMap<String, Arc<MemoryGeneration>>>,
}

impl MemoryCacheStorage {
    /// Create an empty storage registry
    pub fn new() -> Self {
        Self {
            generations: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCacheStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn Generation>, CacheError> {
        let mut generations = self.generations.write();
        let generation = generations
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryGeneration::new()));
        Ok(Arc::clone(generation) as Arc<dyn Generation>)
    }

    async fn names(&self) -> Result<Vec<String>, CacheError> {
        let generations = self.generations.read();
        Ok(generations.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let mut generations = self.generations.write();
        Ok(generations.remove(name).is_some())
    }
}
