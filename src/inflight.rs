//! Coalescing of concurrent fetches for the same URL.
//!
//! The first caller for a URL starts the fetch; callers arriving while it is
//! pending await the same shared future. The entry is removed as soon as any
//! caller finishes or is cancelled, so a later call always hits the network
//! again and never joins an abandoned fetch.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use statepack_transport::PackTransport;
use tracing::debug;

/// Outcome shared between coalesced callers. Errors are rendered to strings
/// so the output is `Clone`.
pub type FetchOutcome = Result<Arc<Vec<u8>>, String>;

type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;
type PendingMap = Mutex<HashMap<String, SharedFetch>>;

/// Removes its fetch from the map when the awaiting caller completes or is
/// dropped, unless a newer fetch already replaced it.
struct PendingGuard<'a> {
    pending: &'a PendingMap,
    url: &'a str,
    fetch: SharedFetch,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self.pending.lock();
        if pending.get(self.url).is_some_and(|current| current.ptr_eq(&self.fetch)) {
            pending.remove(self.url);
        }
    }
}

/// Map of pending fetches keyed by URL.
#[derive(Clone, Default)]
pub struct InflightFetches {
    pending: Arc<PendingMap>,
}

impl InflightFetches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch `url`, joining a pending fetch of the same URL if there is one.
    pub async fn fetch(&self, transport: Arc<dyn PackTransport>, url: &str) -> FetchOutcome {
        let fetch = {
            let mut pending = self.pending.lock();
            match pending.get(url) {
                Some(existing) => {
                    debug!(url, "joining in-flight fetch");
                    existing.clone()
                }
                None => {
                    let owned = url.to_string();
                    let fetch = async move {
                        transport
                            .fetch(&owned)
                            .await
                            .map(Arc::new)
                            .map_err(|e| e.to_string())
                    }
                    .boxed()
                    .shared();
                    pending.insert(url.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        let guard = PendingGuard {
            pending: &self.pending,
            url,
            fetch: fetch.clone(),
        };
        let outcome = fetch.await;
        drop(guard);
        outcome
    }

    /// Number of fetches currently pending.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}
