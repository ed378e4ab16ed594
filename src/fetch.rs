//! Remote document retrieval shared by the manifest cache and the resolver.

use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::context::RemoteSource;
use crate::inflight::InflightFetches;

/// A parsed remote document and the SHA-256 of its raw body.
#[derive(Debug, Clone)]
pub(crate) struct FetchedDocument {
    pub value: Value,
    pub sha256: String,
}

/// GET `url` through the coalescing map and parse the body as JSON.
///
/// Transport and parse failures come back as display strings ready for
/// `status.error`.
pub(crate) async fn fetch_document(
    remote: &RemoteSource,
    inflight: &InflightFetches,
    url: &str,
) -> Result<FetchedDocument, String> {
    let body = inflight
        .fetch(Arc::clone(&remote.transport), url)
        .await?;
    let value = serde_json::from_slice(body.as_slice())
        .map_err(|e| format!("Failed to parse {}: {}", url, e))?;
    let sha256 = hex::encode(Sha256::digest(body.as_slice()));
    debug!(url, sha256 = %sha256, "parsed remote document");
    Ok(FetchedDocument { value, sha256 })
}

/// Compare a manifest `contentHash` with a body digest.
///
/// Accepts a bare hex digest or one prefixed with `sha256:`, in either case.
pub(crate) fn content_hash_matches(advertised: &str, sha256: &str) -> bool {
    let advertised = advertised.trim();
    let advertised = advertised
        .strip_prefix("sha256:")
        .or_else(|| advertised.strip_prefix("SHA256:"))
        .unwrap_or(advertised);
    advertised.eq_ignore_ascii_case(sha256)
}
