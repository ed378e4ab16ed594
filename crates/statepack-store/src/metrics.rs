//! Counters for resolver outcomes.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Resolver outcome metrics (thread-safe counters).
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    /// Packs served fresh from the remote source
    pub remote_fetches: Arc<AtomicU64>,
    /// Remote attempts that failed (network, parse or validation)
    pub remote_failures: Arc<AtomicU64>,
    /// Packs served from the local store
    pub cache_hits: Arc<AtomicU64>,
    /// Cache hits that were past TTL or behind the manifest
    pub stale_serves: Arc<AtomicU64>,
    /// Packs served from the bundled seed
    pub seed_fallbacks: Arc<AtomicU64>,
    /// Documents rejected by schema validation
    pub validation_rejects: Arc<AtomicU64>,
    /// Manifests fetched from the remote source
    pub manifest_refreshes: Arc<AtomicU64>,
    /// Manifest fetches that failed
    pub manifest_failures: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn record_remote_fetch(&self) {
        self.remote_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_failure(&self) {
        self.remote_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache hit, noting whether it was stale.
    pub fn record_cache_hit(&self, stale: bool) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        if stale {
            self.stale_serves.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_seed_fallback(&self) {
        self.seed_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_reject(&self) {
        self.validation_rejects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_manifest_refresh(&self) {
        self.manifest_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_manifest_failure(&self) {
        self.manifest_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            remote_fetches: self.remote_fetches.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            stale_serves: self.stale_serves.load(Ordering::Relaxed),
            seed_fallbacks: self.seed_fallbacks.load(Ordering::Relaxed),
            validation_rejects: self.validation_rejects.load(Ordering::Relaxed),
            manifest_refreshes: self.manifest_refreshes.load(Ordering::Relaxed),
            manifest_failures: self.manifest_failures.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.remote_fetches,
            &self.remote_failures,
            &self.cache_hits,
            &self.stale_serves,
            &self.seed_fallbacks,
            &self.validation_rejects,
            &self.manifest_refreshes,
            &self.manifest_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Snapshot of metrics (for reporting).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub remote_fetches: u64,
    pub remote_failures: u64,
    pub cache_hits: u64,
    pub stale_serves: u64,
    pub seed_fallbacks: u64,
    pub validation_rejects: u64,
    pub manifest_refreshes: u64,
    pub manifest_failures: u64,
}

impl MetricsSnapshot {
    /// Pack lookups that produced a pack.
    pub fn total_served(&self) -> u64 {
        self.remote_fetches + self.cache_hits + self.seed_fallbacks
    }

    /// Share of served packs that came from the remote source.
    pub fn remote_rate(&self) -> f64 {
        let total = self.total_served();
        if total == 0 {
            return 0.0;
        }
        self.remote_fetches as f64 / total as f64
    }

    /// Format a human-readable report.
    pub fn format_report(&self) -> String {
        format!(
            "Pack Resolution Metrics:\n\
             \x20 Remote: {} served, {} failed\n\
             \x20 Cache:  {} hits ({} stale)\n\
             \x20 Seed:   {} fallbacks\n\
             \x20 Rejected by validation: {}\n\
             \x20 Manifest: {} refreshed, {} failed\n\
             \x20 Remote rate: {:.1}%",
            self.remote_fetches,
            self.remote_failures,
            self.cache_hits,
            self.stale_serves,
            self.seed_fallbacks,
            self.validation_rejects,
            self.manifest_refreshes,
            self.manifest_failures,
            self.remote_rate() * 100.0,
        )
    }
}
