// Metrics module - Prometheus-compatible metrics tracking
// Counts every interception outcome plus lifecycle events

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics struct tracks counters for Prometheus export
/// Thread-safe via atomic operations; one instance is shared by the
/// lifecycle manager and all concurrently-handled requests.
#[derive(Default)]
pub struct Metrics {
    // Interception counters, one per terminal state
    requests_total: AtomicU64,
    passthrough_total: AtomicU64,
    network_served_total: AtomicU64,
    cache_served_total: AtomicU64,
    shell_fallback_total: AtomicU64,
    synthetic_error_total: AtomicU64,

    // Lifecycle counters
    precache_failures_total: AtomicU64,
    stale_generations_swept_total: AtomicU64,

    // Background write supervision
    runtime_write_failures_total: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_passthrough(&self) {
        self.passthrough_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_network_served(&self) {
        self.network_served_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_served(&self) {
        self.cache_served_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shell_fallback(&self) {
        self.shell_fallback_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_synthetic_error(&self) {
        self.synthetic_error_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_precache_failure(&self) {
        self.precache_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_generation_swept(&self) {
        self.stale_generations_swept_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_runtime_write_failure(&self) {
        self.runtime_write_failures_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn network_served_total(&self) -> u64 {
        self.network_served_total.load(Ordering::Relaxed)
    }

    pub fn cache_served_total(&self) -> u64 {
        self.cache_served_total.load(Ordering::Relaxed)
    }

    pub fn shell_fallback_total(&self) -> u64 {
        self.shell_fallback_total.load(Ordering::Relaxed)
    }

    pub fn synthetic_error_total(&self) -> u64 {
        self.synthetic_error_total.load(Ordering::Relaxed)
    }

    pub fn precache_failures_total(&self) -> u64 {
        self.precache_failures_total.load(Ordering::Relaxed)
    }

    /// Export all metrics in Prometheus text exposition format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP amagasa_requests_total Total GET requests intercepted\n");
        output.push_str("# TYPE amagasa_requests_total counter\n");
        output.push_str(&format!(
            "amagasa_requests_total {}\n",
            self.requests_total.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP amagasa_passthrough_total Non-GET requests passed through\n");
        output.push_str("# TYPE amagasa_passthrough_total counter\n");
        output.push_str(&format!(
            "amagasa_passthrough_total {}\n",
            self.passthrough_total.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP amagasa_served_total Requests served by path\n");
        output.push_str("# TYPE amagasa_served_total counter\n");
        output.push_str(&format!(
            "amagasa_served_total{{source=\"network\"}} {}\n",
            self.network_served_total.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "amagasa_served_total{{source=\"cache\"}} {}\n",
            self.cache_served_total.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "amagasa_served_total{{source=\"shell_fallback\"}} {}\n",
            self.shell_fallback_total.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "amagasa_served_total{{source=\"synthetic_error\"}} {}\n",
            self.synthetic_error_total.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP amagasa_precache_failures_total Failed precache batches\n");
        output.push_str("# TYPE amagasa_precache_failures_total counter\n");
        output.push_str(&format!(
            "amagasa_precache_failures_total {}\n",
            self.precache_failures_total.load(Ordering::Relaxed)
        ));

        output.push_str(
            "\n# HELP amagasa_stale_generations_swept_total Stale generations deleted\n",
        );
        output.push_str("# TYPE amagasa_stale_generations_swept_total counter\n");
        output.push_str(&format!(
            "amagasa_stale_generations_swept_total {}\n",
            self.stale_generations_swept_total.load(Ordering::Relaxed)
        ));

        output.push_str(
            "\n# HELP amagasa_runtime_write_failures_total Background cache writes that failed\n",
        );
        output.push_str("# TYPE amagasa_runtime_write_failures_total counter\n");
        output.push_str(&format!(
            "amagasa_runtime_write_failures_total {}\n",
            self.runtime_write_failures_total.load(Ordering::Relaxed)
        ));

        output
    }
}
