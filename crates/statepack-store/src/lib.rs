//! Local storage for cached manifests and state packs.
//!
//! This crate provides:
//! - [`LocalStore`]: get/set/remove/list of opaque JSON blobs keyed by string
//! - [`FsStore`]: one atomically written JSON file per key, durable across restarts
//! - [`MemoryStore`]: process-local fallback used when no cache directory is usable
//! - [`keys`]: cache key composition (state + schema version + pack version)
//! - [`CacheMetrics`]: counters for resolver outcomes

pub mod fs;
pub mod keys;
pub mod memory;
pub mod metrics;
pub mod paths;

use anyhow::Result;
use serde_json::Value;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use metrics::{CacheMetrics, MetricsSnapshot};

/// Key-value storage of JSON documents.
///
/// Reads never fail: a missing key, an unreadable entry and a malformed
/// entry all come back as `None`. Writes report failure so callers can log
/// it, but callers are expected to carry on without the write.
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &Value) -> Result<()>;

    /// Delete `key`. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;

    /// All stored keys starting with `prefix`, sorted.
    fn keys(&self, prefix: &str) -> Vec<String>;
}
