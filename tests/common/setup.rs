//! Resolver harness.

use std::sync::Arc;

use statepack::store::MemoryStore;
use statepack::transport::PackEndpoints;
use statepack::{ManualClock, PackContext, PackResolver, PackStoreConfig};

use super::fixtures::{t0, BASE_URL};
use super::mocks::MockTransport;

pub struct Harness {
    pub resolver: PackResolver,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<MockTransport>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    /// No remote configured: cache and seed only.
    pub fn offline() -> Self {
        Self::build(false)
    }

    /// Remote configured at [`BASE_URL`] through the mock transport.
    pub fn online() -> Self {
        Self::build(true)
    }

    fn build(online: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(MockTransport::new());
        let clock = Arc::new(ManualClock::new(t0()));

        let mut ctx = PackContext::new(PackStoreConfig::offline_memory(), store.clone())
            .with_clock(clock.clone());
        if online {
            let endpoints = PackEndpoints::new(BASE_URL).unwrap();
            ctx = ctx.with_remote(endpoints, transport.clone());
        }

        Self {
            resolver: PackResolver::new(ctx),
            store,
            transport,
            clock,
        }
    }
}
