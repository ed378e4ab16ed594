//! Runtime configuration.
//!
//! Built from defaults, then environment variables, then (in the CLI) flags.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use statepack_store::{FsStore, LocalStore, MemoryStore};
use statepack_types::env_utils::{env_bool_or, env_nonempty, env_var_or};
use tracing::{debug, warn};

/// Default manifest TTL: 6 hours.
pub const DEFAULT_MANIFEST_TTL_SECS: u64 = 6 * 60 * 60;
/// Default pack TTL: 7 days.
pub const DEFAULT_PACK_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// Configuration for the pack store and resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackStoreConfig {
    /// Remote base URL. `None` means cache/seed-only mode.
    pub base_url: Option<String>,
    /// Filesystem store root. `None` selects the memory store.
    pub cache_dir: Option<PathBuf>,
    /// Force the in-memory store even if a cache dir is set.
    pub memory_store: bool,
    pub manifest_ttl_secs: u64,
    pub pack_ttl_secs: u64,
    pub http_timeout_ms: u64,
}

impl Default for PackStoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            cache_dir: Some(default_cache_dir()),
            memory_store: false,
            manifest_ttl_secs: DEFAULT_MANIFEST_TTL_SECS,
            pack_ttl_secs: DEFAULT_PACK_TTL_SECS,
            http_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }
}

impl PackStoreConfig {
    /// Defaults overridden by `STATEPACK_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_nonempty("STATEPACK_BASE_URL"),
            cache_dir: env_nonempty("STATEPACK_CACHE_DIR")
                .map(PathBuf::from)
                .or(defaults.cache_dir),
            memory_store: env_bool_or("STATEPACK_MEMORY_STORE", false),
            manifest_ttl_secs: env_var_or("STATEPACK_MANIFEST_TTL_SECS", defaults.manifest_ttl_secs),
            pack_ttl_secs: env_var_or("STATEPACK_PACK_TTL_SECS", defaults.pack_ttl_secs),
            http_timeout_ms: env_var_or("STATEPACK_HTTP_TIMEOUT_MS", defaults.http_timeout_ms),
        }
    }

    /// Config for a process-local store with no remote source.
    pub fn offline_memory() -> Self {
        Self {
            cache_dir: None,
            memory_store: true,
            ..Self::default()
        }
    }

    pub fn manifest_ttl(&self) -> Duration {
        Duration::from_secs(self.manifest_ttl_secs)
    }

    pub fn pack_ttl(&self) -> Duration {
        Duration::from_secs(self.pack_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Open the configured store.
    ///
    /// Falls back to the memory store if the cache directory cannot be
    /// created, so a read-only or missing home never stops resolution.
    pub fn open_store(&self) -> Arc<dyn LocalStore> {
        if self.memory_store {
            return Arc::new(MemoryStore::new());
        }
        let Some(dir) = &self.cache_dir else {
            return Arc::new(MemoryStore::new());
        };
        match FsStore::new(dir) {
            Ok(store) => {
                debug!(root = %store.cache_root().display(), "using file store");
                Arc::new(store)
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cache dir unusable, using memory store");
                Arc::new(MemoryStore::new())
            }
        }
    }
}

/// `$XDG_CACHE_HOME/statepack` or platform equivalent.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("statepack")
}
