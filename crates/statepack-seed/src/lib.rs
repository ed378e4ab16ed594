//! Bundled seed packs.
//!
//! Georgia ships a curated pack. Every other code in [`STATES`] gets a
//! baseline placeholder with empty content, flagged `quality: "baseline"`.
//! Seed packs are raw documents; the resolver validates and normalizes them
//! like any other source.

pub mod states;

use serde_json::{json, Value};
use statepack_types::{normalize_state_code, BASELINE_QUALITY, CURRENT_SCHEMA_VERSION};
use tracing::error;

pub use states::{state_by_code, state_by_name, StateInfo, STATES};

/// Pack version stamped on every baseline placeholder.
pub const BASELINE_PACK_VERSION: &str = "baseline-2026-02-20";

const GA_PACK: &str = include_str!("../data/ga.json");

/// Source of last-resort packs.
pub trait SeedSource: Send + Sync {
    /// Raw seed pack for `state`, or `None` if there is none.
    fn get_state_pack(&self, state: &str) -> Option<Value>;
}

/// Seed packs compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct BundledSeed;

impl BundledSeed {
    pub fn new() -> Self {
        Self
    }

    /// Whether `state` has curated (non-baseline) content.
    pub fn is_curated(state: &str) -> bool {
        normalize_state_code(state) == "GA"
    }
}

impl SeedSource for BundledSeed {
    fn get_state_pack(&self, state: &str) -> Option<Value> {
        let info = state_by_code(state)?;
        if Self::is_curated(info.code) {
            return match serde_json::from_str(GA_PACK) {
                Ok(pack) => Some(pack),
                Err(e) => {
                    error!(state = info.code, error = %e, "bundled seed pack is not valid JSON");
                    None
                }
            };
        }
        Some(baseline_pack(info.code))
    }
}

/// Placeholder pack for a state without curated content.
pub fn baseline_pack(state: &str) -> Value {
    json!({
        "state": normalize_state_code(state),
        "schemaVersion": CURRENT_SCHEMA_VERSION,
        "packVersion": BASELINE_PACK_VERSION,
        "quality": BASELINE_QUALITY,
        "jurisdictions_sources": { "code": "", "rules": "", "opinions": "" },
        "domains": [],
        "issues": [],
        "authoritiesByIssue": {},
        "authorities": {},
        "legalTests": [],
        "testItems": [],
        "traps": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_ga() {
        let pack = BundledSeed::new().get_state_pack("ga").unwrap();
        assert_eq!(pack["state"], "GA");
        assert_eq!(pack["packVersion"], "seed-ga-2026-02-20");
        assert_eq!(pack["domains"].as_array().unwrap().len(), 3);
        assert_eq!(pack["testItems"].as_array().unwrap().len(), 6);
        assert!(pack.get("quality").is_none());
        assert_eq!(
            pack["authoritiesByIssue"]["emergency_custody"][0],
            "OCGA § 19-9-1"
        );
    }

    #[test]
    fn test_baseline_for_other_states() {
        let seed = BundledSeed::new();
        for info in STATES.iter().filter(|s| s.code != "GA") {
            let pack = seed.get_state_pack(info.code).unwrap();
            assert_eq!(pack["state"], info.code);
            assert_eq!(pack["quality"], BASELINE_QUALITY);
            assert_eq!(pack["packVersion"], BASELINE_PACK_VERSION);
            assert!(pack["issues"].as_array().unwrap().is_empty());
        }
    }

    #[test]
    fn test_unknown_codes() {
        let seed = BundledSeed::new();
        assert_eq!(seed.get_state_pack("ZZ"), None);
        assert_eq!(seed.get_state_pack(""), None);
    }
}
