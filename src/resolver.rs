//! Pack resolution: remote, cache and seed tiers.
//!
//! For one `get_pack` call the order is fixed: manifest check, then cache
//! lookup and freshness comparison, then the network, then the seed. Every
//! failure degrades to the next tier and ends up in `status.error`; nothing
//! is raised to the caller.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use statepack_schema::{normalize, validate_state_pack};
use statepack_store::keys::{is_seed_key, pack_key, schema_prefix, seed_key, state_prefix};
use statepack_store::MetricsSnapshot;
use statepack_types::{
    normalize_state_code, CachedPayload, ManifestEntry, ManifestResult, PackResult, PackSource,
    PackStatus, StatePack, CURRENT_SCHEMA_VERSION,
};
use tracing::{debug, info, warn};

use crate::context::{PackContext, RemoteSource};
use crate::fetch::{content_hash_matches, fetch_document};
use crate::inflight::InflightFetches;
use crate::manifest_cache::ManifestCache;

/// Options for [`PackResolver::get_pack`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackOptions {
    /// Fetch from the remote source even if the cache is fresh.
    /// Ignored when no remote is configured.
    pub force_remote: bool,
}

impl PackOptions {
    pub fn force_remote() -> Self {
        Self { force_remote: true }
    }
}

/// A pack read back from the store.
#[derive(Debug, Clone)]
struct CachedPack {
    key: String,
    entry: CachedPayload<StatePack>,
}

impl CachedPack {
    /// The version the entry was stored under. This is the manifest's version
    /// when one was advertised at fetch time, which may differ from the
    /// body's own `packVersion`.
    fn version(&self) -> &str {
        self.entry
            .pack_version
            .as_deref()
            .unwrap_or(self.entry.payload.pack_version.as_str())
    }
}

/// Resolves state codes to packs.
#[derive(Clone)]
pub struct PackResolver {
    ctx: PackContext,
    manifests: ManifestCache,
    inflight: InflightFetches,
}

impl PackResolver {
    pub fn new(ctx: PackContext) -> Self {
        let inflight = InflightFetches::new();
        Self {
            manifests: ManifestCache::new(ctx.clone(), inflight.clone()),
            ctx,
            inflight,
        }
    }

    pub fn context(&self) -> &PackContext {
        &self.ctx
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// See [`ManifestCache::get_manifest`].
    pub async fn get_manifest(&self, force: bool) -> ManifestResult {
        self.manifests.get_manifest(force).await
    }

    /// Resolve `state` to a pack.
    pub async fn get_pack(&self, state: &str, opts: PackOptions) -> PackResult {
        let state = normalize_state_code(state);
        let now = self.ctx.now();
        if state.is_empty() {
            return none_result(&state, now, "state code is empty".to_string());
        }

        let manifest = self.manifests.get_manifest(false).await.manifest;
        let advertised = manifest.as_ref().and_then(|m| m.entry(&state)).cloned();
        let advertised_version = advertised.as_ref().map(|e| e.pack_version.as_str());

        let remote = self.ctx.remote.as_ref();

        if let (true, Some(remote)) = (opts.force_remote, remote) {
            return match self.fetch_remote(remote, &state, advertised.as_ref(), now).await {
                Ok(result) => result,
                Err(error) => match self.find_cached(&state, advertised_version) {
                    Some(cached) => {
                        let stale = self.is_stale(&cached, advertised_version, now);
                        self.cache_result(&state, cached, now, stale, Some(error))
                    }
                    None => none_result(&state, now, error),
                },
            };
        }

        let mut last_error = None;

        if let Some(cached) = self.find_cached(&state, advertised_version) {
            let stale = self.is_stale(&cached, advertised_version, now);
            if !stale {
                debug!(state = %state, key = %cached.key, "serving fresh cached pack");
                return self.cache_result(&state, cached, now, false, None);
            }
            let Some(remote) = remote else {
                return self.cache_result(&state, cached, now, true, None);
            };
            return match self.fetch_remote(remote, &state, advertised.as_ref(), now).await {
                Ok(result) => result,
                Err(error) => self.cache_result(&state, cached, now, true, Some(error)),
            };
        }

        if let Some(remote) = remote {
            match self.fetch_remote(remote, &state, advertised.as_ref(), now).await {
                Ok(result) => return result,
                Err(error) => last_error = Some(error),
            }
        }

        self.seed_fallback(&state, now, last_error)
    }

    /// Cache-only read. Never touches the network.
    pub fn get_cached_pack(&self, state: &str) -> PackResult {
        let state = normalize_state_code(state);
        let now = self.ctx.now();
        if state.is_empty() {
            return none_result(&state, now, "state code is empty".to_string());
        }

        let manifest = self.manifests.cached_manifest();
        let advertised_version = manifest
            .as_ref()
            .and_then(|m| m.payload.pack_version(&state));

        match self.find_cached(&state, advertised_version) {
            Some(cached) => {
                let stale = self.is_stale(&cached, advertised_version, now);
                self.cache_result(&state, cached, now, stale, None)
            }
            None => none_result(&state, now, format!("no cached pack for {}", state)),
        }
    }

    /// Remove every cached pack of `state`, across all schema and pack
    /// versions. Returns the number of entries removed.
    pub fn clear_cached_pack(&self, state: &str) -> Result<usize> {
        let state = normalize_state_code(state);
        if state.is_empty() {
            return Ok(0);
        }
        let keys = self.ctx.store.keys(&state_prefix(&state));
        for key in &keys {
            self.ctx.store.remove(key)?;
        }
        info!(state = %state, removed = keys.len(), "cleared cached packs");
        Ok(keys.len())
    }

    /// Look up a cached pack: the manifest-advertised version, then the
    /// seed entry, then anything else cached under the current schema.
    fn find_cached(&self, state: &str, advertised: Option<&str>) -> Option<CachedPack> {
        let mut tried = Vec::with_capacity(2);
        if let Some(version) = advertised {
            tried.push(pack_key(state, CURRENT_SCHEMA_VERSION, version));
        }
        tried.push(seed_key(state, CURRENT_SCHEMA_VERSION));

        for key in &tried {
            if let Some(found) = self.read_cached(key, state) {
                return Some(found);
            }
        }

        let discovered: Vec<CachedPack> = self
            .ctx
            .store
            .keys(&schema_prefix(state, CURRENT_SCHEMA_VERSION))
            .into_iter()
            .filter(|key| !tried.contains(key))
            .filter_map(|key| self.read_cached(&key, state))
            .collect();

        if let Some(version) = advertised {
            if let Some(found) = discovered.iter().find(|c| c.version() == version) {
                return Some(found.clone());
            }
        }
        discovered.into_iter().max_by_key(|c| c.entry.cached_at)
    }

    /// Read and re-validate one cached entry. Anything off reads as absent.
    fn read_cached(&self, key: &str, state: &str) -> Option<CachedPack> {
        let raw = self.ctx.store.get(key)?;
        let envelope: CachedPayload<Value> = match serde_json::from_value(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(key, error = %e, "malformed pack envelope, ignoring");
                return None;
            }
        };
        if let Err(e) = validate_state_pack(&envelope.payload) {
            self.ctx.metrics.record_validation_reject();
            warn!(key, error = %e, "cached pack failed validation, ignoring");
            return None;
        }
        let entry = envelope.map(|payload| normalize(&payload));
        if !entry.payload.state.is_empty() && entry.payload.state != state {
            warn!(key, found = %entry.payload.state, "cached pack is for another state, ignoring");
            return None;
        }
        Some(CachedPack {
            key: key.to_string(),
            entry,
        })
    }

    /// Past TTL, or behind the version the manifest advertises.
    fn is_stale(&self, cached: &CachedPack, advertised: Option<&str>, now: DateTime<Utc>) -> bool {
        let expired = cached.entry.is_older_than(now, self.ctx.config.pack_ttl());
        let superseded = advertised.is_some_and(|v| v != cached.version());
        expired || superseded
    }

    async fn fetch_remote(
        &self,
        remote: &RemoteSource,
        state: &str,
        advertised: Option<&ManifestEntry>,
        now: DateTime<Utc>,
    ) -> Result<PackResult, String> {
        let url = remote.endpoints.pack_url(state);
        let result = self.fetch_and_store(remote, &url, state, advertised, now).await;
        match &result {
            Ok(_) => self.ctx.metrics.record_remote_fetch(),
            Err(error) => {
                self.ctx.metrics.record_remote_failure();
                warn!(state, url = %url, error = %error, "remote pack fetch failed");
            }
        }
        result
    }

    async fn fetch_and_store(
        &self,
        remote: &RemoteSource,
        url: &str,
        state: &str,
        advertised: Option<&ManifestEntry>,
        now: DateTime<Utc>,
    ) -> Result<PackResult, String> {
        let doc = fetch_document(remote, &self.inflight, url).await?;
        let pack = self.admit(&doc.value, state, "remote")?;

        // Stored under the version that was asked for, so the next lookup
        // against the same manifest finds it.
        let version = advertised
            .map(|entry| entry.pack_version.as_str())
            .unwrap_or(pack.pack_version.as_str());
        if version != pack.pack_version {
            warn!(
                state,
                advertised = version,
                body = %pack.pack_version,
                "remote pack version differs from manifest"
            );
        }
        let key = pack_key(state, CURRENT_SCHEMA_VERSION, version);
        if is_seed_key(&key) {
            self.ctx.metrics.record_validation_reject();
            return Err(format!(
                "remote pack for {} uses the reserved version {:?}",
                state, version
            ));
        }
        self.persist(&key, &pack, version, now);

        let content_verified = advertised
            .and_then(|entry| entry.content_hash.as_deref())
            .map(|hash| content_hash_matches(hash, &doc.sha256));
        if content_verified == Some(false) {
            warn!(state, url, "pack body does not match manifest contentHash");
        }

        info!(state, version = %pack.pack_version, "fetched remote pack");
        let mut status = PackStatus::new(state, PackSource::Remote, now).describing(&pack);
        status.last_fetched_at = Some(now);
        status.is_stale = Some(false);
        status.cache_key = Some(key);
        status.content_verified = content_verified;
        Ok(PackResult {
            pack: Some(pack),
            status,
        })
    }

    fn seed_fallback(&self, state: &str, now: DateTime<Utc>, last_error: Option<String>) -> PackResult {
        let Some(raw) = self.ctx.seed.get_state_pack(state) else {
            let error = last_error.unwrap_or_else(|| format!("no pack available for {}", state));
            return none_result(state, now, error);
        };

        let pack = match self.admit(&raw, state, "seed") {
            Ok(pack) => pack,
            Err(error) => return none_result(state, now, error),
        };

        let key = seed_key(state, CURRENT_SCHEMA_VERSION);
        self.persist(&key, &pack, &pack.pack_version, now);
        self.ctx.metrics.record_seed_fallback();
        info!(state, version = %pack.pack_version, "serving seed pack");

        let mut status = PackStatus::new(state, PackSource::Seed, now).describing(&pack);
        status.cache_key = Some(key);
        status.error = last_error;
        PackResult {
            pack: Some(pack),
            status,
        }
    }

    /// Validate, normalize and state-check a candidate from `origin`.
    ///
    /// A pack without a state code is adopted for the requested state.
    fn admit(&self, candidate: &Value, state: &str, origin: &str) -> Result<StatePack, String> {
        if let Err(e) = validate_state_pack(candidate) {
            self.ctx.metrics.record_validation_reject();
            return Err(format!("invalid {} pack for {}: {}", origin, state, e));
        }
        let mut pack = normalize(candidate);
        if pack.state.is_empty() {
            pack.state = state.to_string();
        } else if pack.state != state {
            self.ctx.metrics.record_validation_reject();
            return Err(format!(
                "{} pack is for {}, expected {}",
                origin, pack.state, state
            ));
        }
        Ok(pack)
    }

    /// Write a pack envelope. Failure is logged and otherwise ignored.
    fn persist(&self, key: &str, pack: &StatePack, version: &str, now: DateTime<Utc>) {
        let envelope = CachedPayload::new(
            pack,
            pack.schema_version.clone(),
            Some(version.to_string()),
            now,
        );
        let stored = serde_json::to_value(&envelope)
            .map_err(anyhow::Error::from)
            .and_then(|value| self.ctx.store.set(key, &value));
        if let Err(e) = stored {
            warn!(key, error = %e, "failed to persist pack");
        }
    }

    fn cache_result(
        &self,
        state: &str,
        cached: CachedPack,
        now: DateTime<Utc>,
        stale: bool,
        error: Option<String>,
    ) -> PackResult {
        self.ctx.metrics.record_cache_hit(stale);
        let CachedPack { key, entry } = cached;
        let mut status = PackStatus::new(state, PackSource::Cache, now).describing(&entry.payload);
        status.last_fetched_at = Some(entry.cached_at);
        status.is_stale = Some(stale);
        status.cache_key = Some(key);
        status.error = error;
        PackResult {
            pack: Some(entry.payload),
            status,
        }
    }
}

fn none_result(state: &str, now: DateTime<Utc>, error: String) -> PackResult {
    PackResult {
        pack: None,
        status: PackStatus::new(state, PackSource::None, now).with_error(error),
    }
}
