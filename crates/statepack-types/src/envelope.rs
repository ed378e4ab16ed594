//! Persisted cache envelope.
//!
//! Every manifest or pack written to local storage is wrapped with the time
//! it was written. `cachedAt` is always assigned locally at write time and
//! never copied from the remote payload, so freshness does not depend on the
//! publisher's clock.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached manifest or pack plus its capture metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPayload<T> {
    /// When this entry was written locally.
    pub cached_at: DateTime<Utc>,
    /// Schema version of the wrapped payload.
    pub schema_version: String,
    /// Pack version of the wrapped payload (packs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_version: Option<String>,
    pub payload: T,
}

impl<T> CachedPayload<T> {
    pub fn new(
        payload: T,
        schema_version: impl Into<String>,
        pack_version: Option<String>,
        cached_at: DateTime<Utc>,
    ) -> Self {
        Self {
            cached_at,
            schema_version: schema_version.into(),
            pack_version,
            payload,
        }
    }

    /// Whether the entry is older than `ttl` as of `now`.
    ///
    /// Entries stamped in the future (local clock moved backwards) count as fresh.
    pub fn is_older_than(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (now - self.cached_at).to_std() {
            Ok(age) => age > ttl,
            Err(_) => false,
        }
    }

    /// Swap the payload while keeping the capture metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CachedPayload<U> {
        CachedPayload {
            cached_at: self.cached_at,
            schema_version: self.schema_version,
            pack_version: self.pack_version,
            payload: f(self.payload),
        }
    }
}
