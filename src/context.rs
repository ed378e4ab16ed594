//! Explicit context carried by the resolver.
//!
//! Everything that would otherwise be process-global (configured base URL,
//! storage backend, clock, seed table, counters) lives here, so tests and
//! embedders can build as many independent resolvers as they like.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use statepack_seed::{BundledSeed, SeedSource};
use statepack_store::{CacheMetrics, LocalStore};
use statepack_transport::{HttpTransport, PackEndpoints, PackTransport};

use crate::config::PackStoreConfig;

/// Time source for `cachedAt` stamps and staleness checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A configured remote pack source.
#[derive(Clone)]
pub struct RemoteSource {
    pub endpoints: PackEndpoints,
    pub transport: Arc<dyn PackTransport>,
}

impl fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSource")
            .field("base", &self.endpoints.base())
            .finish_non_exhaustive()
    }
}

/// Dependencies of a [`crate::PackResolver`].
#[derive(Clone)]
pub struct PackContext {
    pub config: PackStoreConfig,
    pub store: Arc<dyn LocalStore>,
    /// `None` puts the resolver in cache/seed-only mode.
    pub remote: Option<RemoteSource>,
    pub clock: Arc<dyn Clock>,
    pub seed: Arc<dyn SeedSource>,
    pub metrics: CacheMetrics,
}

impl PackContext {
    /// Context over `store` with no remote, the system clock and the bundled seed.
    pub fn new(config: PackStoreConfig, store: Arc<dyn LocalStore>) -> Self {
        Self {
            config,
            store,
            remote: None,
            clock: Arc::new(SystemClock),
            seed: Arc::new(BundledSeed::new()),
            metrics: CacheMetrics::default(),
        }
    }

    /// Production wiring: configured store, and an HTTP remote when a base URL is set.
    pub fn from_config(config: PackStoreConfig) -> Self {
        let store = config.open_store();
        let remote = config
            .base_url
            .as_deref()
            .and_then(PackEndpoints::new)
            .map(|endpoints| RemoteSource {
                endpoints,
                transport: Arc::new(HttpTransport::new(config.http_timeout())),
            });
        Self {
            remote,
            ..Self::new(config, store)
        }
    }

    pub fn with_remote(mut self, endpoints: PackEndpoints, transport: Arc<dyn PackTransport>) -> Self {
        self.remote = Some(RemoteSource {
            endpoints,
            transport,
        });
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_seed(mut self, seed: Arc<dyn SeedSource>) -> Self {
        self.seed = seed;
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl fmt::Debug for PackContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackContext")
            .field("config", &self.config)
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock() {
        let start = Utc.with_ymd_and_hms(2026, 2, 20, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(chrono::Duration::hours(7));
        assert_eq!(clock.now(), start + chrono::Duration::hours(7));
        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_from_config_remote_wiring() {
        let offline = PackContext::from_config(PackStoreConfig::offline_memory());
        assert!(!offline.has_remote());

        let online = PackContext::from_config(PackStoreConfig {
            base_url: Some("https://packs.example.org/".to_string()),
            ..PackStoreConfig::offline_memory()
        });
        let remote = online.remote.as_ref().unwrap();
        assert_eq!(remote.endpoints.base(), "https://packs.example.org");

        let blank = PackContext::from_config(PackStoreConfig {
            base_url: Some("   ".to_string()),
            ..PackStoreConfig::offline_memory()
        });
        assert!(!blank.has_remote());
    }
}
