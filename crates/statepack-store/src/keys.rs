//! Cache key composition.
//!
//! Pack keys always combine state, schema version and pack version so an
//! entry written under one schema generation can never shadow another:
//!
//! ```text
//! manifest:v1
//! pack:GA:1:2026.02.20     remote pack
//! pack:GA:1:seed           bundled seed pack
//! ```

use statepack_types::normalize_state_code;

/// Key of the single cached manifest envelope.
pub const MANIFEST_KEY: &str = "manifest:v1";

/// Pseudo pack version reserved for seed entries.
pub const SEED_VERSION: &str = "seed";

/// Key for a specific pack version.
pub fn pack_key(state: &str, schema_version: &str, pack_version: &str) -> String {
    format!(
        "{}{}:{}",
        state_prefix(state),
        schema_version,
        pack_version
    )
}

/// Key under which a state's seed pack is cached.
pub fn seed_key(state: &str, schema_version: &str) -> String {
    pack_key(state, schema_version, SEED_VERSION)
}

/// Prefix shared by every cached pack of a state.
pub fn state_prefix(state: &str) -> String {
    format!("pack:{}:", normalize_state_code(state))
}

/// Prefix shared by a state's packs cached under one schema version.
pub fn schema_prefix(state: &str, schema_version: &str) -> String {
    format!("{}{}:", state_prefix(state), schema_version)
}

/// Whether `key` is a seed entry.
pub fn is_seed_key(key: &str) -> bool {
    key.starts_with("pack:") && key.ends_with(&format!(":{}", SEED_VERSION))
}
