//! Cache statistics types
//!
//! Per-generation hit/miss accounting. There is no eviction in this agent
//! (generations are swept wholesale on activation), so no eviction counter.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of one generation's statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of lookup hits
    pub hits: u64,
    /// Number of lookup misses
    pub misses: u64,
    /// Current number of entries in the generation
    pub entry_count: u64,
    /// Approximate stored size in bytes
    pub size_bytes: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total lookups)
    /// Returns 0.0 if there were no lookups
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Statistics tracker using atomics for thread safety
pub(crate) struct CacheStatsTracker {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStatsTracker {
    /// Create a new stats tracker with all counters at zero
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Increment hit counter
    pub fn increment_hits(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment miss counter
    pub fn increment_misses(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics
    pub fn snapshot(&self, entry_count: u64, size_bytes: u64) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count,
            size_bytes,
        }
    }
}
