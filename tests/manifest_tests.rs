//! Manifest cache refresh and fallback.

mod common;

use std::time::Duration;

use chrono::Duration as ChronoDuration;
use serde_json::json;

use common::{manifest_doc, manifest_url, t0, Harness};
use statepack::store::keys::MANIFEST_KEY;
use statepack::store::LocalStore;
use statepack::types::PackSource;

#[tokio::test]
async fn test_offline_without_cache_is_none() {
    let h = Harness::offline();

    let result = h.resolver.get_manifest(true).await;

    assert!(result.manifest.is_none());
    assert_eq!(result.status.source, PackSource::None);
    assert_eq!(result.status.error, None);
    assert_eq!(h.transport.total_calls(), 0);
}

#[tokio::test]
async fn test_offline_serves_cached_copy_even_when_forced() {
    let h = Harness::offline();
    h.store
        .set(
            MANIFEST_KEY,
            &json!({
                "cachedAt": "2026-02-01T00:00:00Z",
                "schemaVersion": "1",
                "payload": manifest_doc(&[("GA", "remote-1")])
            }),
        )
        .unwrap();

    let result = h.resolver.get_manifest(true).await;

    assert_eq!(result.status.source, PackSource::Cache);
    assert_eq!(result.status.is_stale, Some(true));
    assert_eq!(result.manifest.unwrap().pack_version("ga"), Some("remote-1"));
    assert_eq!(h.transport.total_calls(), 0);
}

#[tokio::test]
async fn test_refresh_respects_ttl() {
    let h = Harness::online();
    h.transport
        .respond_json(&manifest_url(), &manifest_doc(&[("GA", "remote-1")]));

    let first = h.resolver.get_manifest(false).await;
    assert_eq!(first.status.source, PackSource::Remote);
    assert_eq!(first.status.last_fetched_at, Some(t0()));
    assert!(h.store.get(MANIFEST_KEY).is_some());

    h.clock.advance(ChronoDuration::hours(5));
    let second = h.resolver.get_manifest(false).await;
    assert_eq!(second.status.source, PackSource::Cache);
    assert_eq!(second.status.is_stale, Some(false));
    assert_eq!(h.transport.calls_to(&manifest_url()), 1);

    let forced = h.resolver.get_manifest(true).await;
    assert_eq!(forced.status.source, PackSource::Remote);
    assert_eq!(h.transport.calls_to(&manifest_url()), 2);

    h.clock.advance(ChronoDuration::hours(7));
    let expired = h.resolver.get_manifest(false).await;
    assert_eq!(expired.status.source, PackSource::Remote);
    assert_eq!(h.transport.calls_to(&manifest_url()), 3);
    assert_eq!(h.resolver.metrics().manifest_refreshes, 3);
}

#[tokio::test]
async fn test_fetch_failure_falls_back_to_stale_cache() {
    let h = Harness::online();
    h.transport
        .respond_json(&manifest_url(), &manifest_doc(&[("GA", "remote-1")]));
    h.resolver.get_manifest(false).await;

    h.clock.advance(ChronoDuration::hours(12));
    h.transport.fail(&manifest_url(), "connection refused");

    let result = h.resolver.get_manifest(false).await;
    assert_eq!(result.status.source, PackSource::Cache);
    assert_eq!(result.status.is_stale, Some(true));
    assert_eq!(result.status.last_fetched_at, Some(t0()));
    assert!(result.status.error.as_deref().unwrap().contains("connection refused"));
    assert_eq!(result.manifest.unwrap().pack_version("GA"), Some("remote-1"));
    assert_eq!(h.resolver.metrics().manifest_failures, 1);
}

#[tokio::test]
async fn test_invalid_manifest_is_discarded() {
    let h = Harness::online();
    h.transport.respond_json(
        &manifest_url(),
        &json!({ "schemaVersion": "1", "packs": { "GA": { "packVersion": "" } } }),
    );

    let result = h.resolver.get_manifest(false).await;

    assert!(result.manifest.is_none());
    assert_eq!(result.status.source, PackSource::None);
    assert!(result.status.error.as_deref().unwrap().contains("packs.GA.packVersion"));
    assert!(h.store.get(MANIFEST_KEY).is_none());
}

#[tokio::test]
async fn test_invalid_manifest_keeps_previous_copy() {
    let h = Harness::online();
    h.transport
        .respond_json(&manifest_url(), &manifest_doc(&[("GA", "remote-1")]));
    h.resolver.get_manifest(false).await;

    h.transport
        .respond_json(&manifest_url(), &json!({ "schemaVersion": 1, "packs": [] }));
    let result = h.resolver.get_manifest(true).await;

    assert_eq!(result.status.source, PackSource::Cache);
    assert_eq!(result.status.is_stale, Some(false));
    assert!(result.status.error.is_some());
    assert_eq!(result.manifest.unwrap().pack_version("GA"), Some("remote-1"));
}

#[tokio::test]
async fn test_corrupt_cached_manifest_reads_as_absent() {
    let h = Harness::offline();
    h.store.set(MANIFEST_KEY, &json!([1, 2, 3])).unwrap();

    let result = h.resolver.get_manifest(false).await;
    assert_eq!(result.status.source, PackSource::None);
}

#[tokio::test]
async fn test_cancelled_refresh_does_not_pin_old_manifest() {
    let h = Harness::online();
    h.transport.set_delay(Duration::from_millis(50));
    h.transport
        .respond_json(&manifest_url(), &manifest_doc(&[("GA", "old-1")]));

    let abandoned =
        tokio::time::timeout(Duration::from_millis(5), h.resolver.get_manifest(true)).await;
    assert!(abandoned.is_err());

    h.transport
        .respond_json(&manifest_url(), &manifest_doc(&[("GA", "new-2")]));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let result = h.resolver.get_manifest(true).await;
    assert_eq!(result.status.source, PackSource::Remote);
    assert_eq!(result.manifest.unwrap().pack_version("GA"), Some("new-2"));
    assert_eq!(h.transport.calls_to(&manifest_url()), 2);
}
