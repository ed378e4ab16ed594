//! Shared types for the statepack workspace.
//!
//! This crate holds the data model every other crate agrees on:
//!
//! - [`manifest`]: the remote version directory (state -> current pack version)
//! - [`pack`]: the canonical (post-normalization) state pack
//! - [`envelope`]: the persisted cache wrapper with a locally assigned `cachedAt`
//! - [`status`]: query-side metadata returned alongside packs and manifests
//! - [`env_utils`]: environment variable parsing used by configuration

pub mod envelope;
pub mod env_utils;
pub mod manifest;
pub mod pack;
pub mod status;

pub use envelope::CachedPayload;
pub use manifest::{Manifest, ManifestEntry};
pub use pack::{
    Authority, Domain, Issue, StatePack, BASELINE_QUALITY, CURRENT_SCHEMA_VERSION,
    DEFAULT_PACK_VERSION,
};
pub use status::{ManifestResult, ManifestStatus, PackResult, PackSource, PackStatus};

/// Canonicalize a state code for lookups, cache keys and URLs.
///
/// `" ga "` -> `"GA"`.
pub fn normalize_state_code(state: &str) -> String {
    state.trim().to_ascii_uppercase()
}
