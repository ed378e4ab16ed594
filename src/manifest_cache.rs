//! Manifest cache.
//!
//! The manifest is refreshed from the remote source when forced or when the
//! cached copy is older than the manifest TTL. Any failure falls back to the
//! cached copy, stale or not.

use chrono::{DateTime, Utc};
use serde_json::Value;
use statepack_schema::validate_manifest;
use statepack_store::keys::MANIFEST_KEY;
use statepack_types::{CachedPayload, Manifest, ManifestResult, ManifestStatus, PackSource};
use tracing::{debug, info, warn};

use crate::context::PackContext;
use crate::fetch::fetch_document;
use crate::inflight::InflightFetches;

/// Reads, refreshes and persists the manifest.
#[derive(Clone)]
pub struct ManifestCache {
    ctx: PackContext,
    inflight: InflightFetches,
}

impl ManifestCache {
    pub fn new(ctx: PackContext, inflight: InflightFetches) -> Self {
        Self { ctx, inflight }
    }

    /// Manifest plus status. Never fails; problems land in `status.error`.
    pub async fn get_manifest(&self, force: bool) -> ManifestResult {
        let now = self.ctx.now();
        let cached = self.cached_manifest();
        let stale = self.is_stale(cached.as_ref(), now);

        let Some(remote) = &self.ctx.remote else {
            return cached_result(cached, now, stale, None);
        };

        if !force && cached.is_some() && !stale {
            debug!("manifest cache fresh, skipping fetch");
            return cached_result(cached, now, false, None);
        }

        let url = remote.endpoints.manifest_url();
        let error = match fetch_document(remote, &self.inflight, &url).await {
            Ok(doc) => match self.accept(doc.value, now) {
                Ok(manifest) => {
                    self.ctx.metrics.record_manifest_refresh();
                    info!(url = %url, states = manifest.packs.len(), "refreshed manifest");
                    let mut status = ManifestStatus::new(PackSource::Remote, now);
                    status.schema_version = Some(manifest.schema_version.clone());
                    status.last_fetched_at = Some(now);
                    status.is_stale = Some(false);
                    return ManifestResult {
                        manifest: Some(manifest),
                        status,
                    };
                }
                Err(e) => e,
            },
            Err(e) => e,
        };

        self.ctx.metrics.record_manifest_failure();
        warn!(url = %url, error = %error, "manifest refresh failed, using cached copy");
        cached_result(cached, now, stale, Some(error))
    }

    /// Cached manifest from storage only. Malformed entries read as absent.
    pub fn cached_manifest(&self) -> Option<CachedPayload<Manifest>> {
        let raw = self.ctx.store.get(MANIFEST_KEY)?;
        let envelope: CachedPayload<Value> = match serde_json::from_value(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(key = MANIFEST_KEY, error = %e, "malformed manifest envelope");
                return None;
            }
        };
        if let Err(e) = validate_manifest(&envelope.payload) {
            self.ctx.metrics.record_validation_reject();
            warn!(key = MANIFEST_KEY, error = %e, "cached manifest failed validation");
            return None;
        }
        let cached_at = envelope.cached_at;
        match serde_json::from_value::<Manifest>(envelope.payload) {
            Ok(manifest) => Some(CachedPayload::new(
                manifest.clone(),
                manifest.schema_version,
                None,
                cached_at,
            )),
            Err(e) => {
                warn!(key = MANIFEST_KEY, error = %e, "cached manifest unreadable");
                None
            }
        }
    }

    fn is_stale(&self, cached: Option<&CachedPayload<Manifest>>, now: DateTime<Utc>) -> bool {
        cached.is_some_and(|c| c.is_older_than(now, self.ctx.config.manifest_ttl()))
    }

    /// Validate and persist a freshly fetched manifest.
    fn accept(&self, candidate: Value, now: DateTime<Utc>) -> Result<Manifest, String> {
        if let Err(e) = validate_manifest(&candidate) {
            self.ctx.metrics.record_validation_reject();
            return Err(format!("invalid manifest: {}", e));
        }
        let manifest: Manifest = serde_json::from_value(candidate.clone())
            .map_err(|e| format!("invalid manifest: {}", e))?;

        let envelope = CachedPayload::new(candidate, manifest.schema_version.clone(), None, now);
        match serde_json::to_value(&envelope) {
            Ok(value) => {
                if let Err(e) = self.ctx.store.set(MANIFEST_KEY, &value) {
                    warn!(error = %e, "failed to persist manifest");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode manifest envelope"),
        }
        Ok(manifest)
    }
}

fn cached_result(
    cached: Option<CachedPayload<Manifest>>,
    now: DateTime<Utc>,
    stale: bool,
    error: Option<String>,
) -> ManifestResult {
    match cached {
        Some(entry) => {
            let mut status = ManifestStatus::new(PackSource::Cache, now);
            status.schema_version = Some(entry.schema_version.clone());
            status.last_fetched_at = Some(entry.cached_at);
            status.is_stale = Some(stale);
            status.error = error;
            ManifestResult {
                manifest: Some(entry.payload),
                status,
            }
        }
        None => {
            let mut status = ManifestStatus::new(PackSource::None, now);
            status.error = error;
            ManifestResult {
                manifest: None,
                status,
            }
        }
    }
}
