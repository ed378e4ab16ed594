//! Manifest format.
//!
//! The manifest is published next to the packs at `{base}/manifest.json`
//! and advertises the current pack version for each state:
//!
//! ```json
//! {
//!   "schemaVersion": "1",
//!   "packs": {
//!     "GA": { "packVersion": "2026.02.20", "contentHash": "sha256:..." },
//!     "WY": { "packVersion": "2026.02.20" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version directory mapping state codes to their published pack version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Format version of the manifest itself.
    pub schema_version: String,

    /// One entry per known state. Absence means no known remote version.
    #[serde(default)]
    pub packs: BTreeMap<String, ManifestEntry>,

    /// Publisher fields this client does not interpret (e.g. `generatedAt`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single state's entry in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub pack_version: String,

    /// Integrity hint for the published pack body. Never used for addressing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Look up a state's entry, ignoring case and surrounding whitespace.
    pub fn entry(&self, state: &str) -> Option<&ManifestEntry> {
        let wanted = crate::normalize_state_code(state);
        self.packs.get(&wanted).or_else(|| {
            self.packs
                .iter()
                .find(|(code, _)| crate::normalize_state_code(code) == wanted)
                .map(|(_, entry)| entry)
        })
    }

    /// The advertised pack version for a state, if the manifest knows it.
    pub fn pack_version(&self, state: &str) -> Option<&str> {
        self.entry(state).map(|e| e.pack_version.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Manifest {
        serde_json::from_value(json!({
            "schemaVersion": "1",
            "generatedAt": "2026-02-20T12:00:00Z",
            "packs": {
                "GA": { "packVersion": "2026.02.20", "contentHash": "sha256:abc" },
                "wy": { "packVersion": "2026.02.19" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_entry_lookup_is_case_insensitive() {
        let manifest = sample();
        assert_eq!(manifest.pack_version("ga"), Some("2026.02.20"));
        assert_eq!(manifest.pack_version("WY"), Some("2026.02.19"));
        assert_eq!(manifest.pack_version("TX"), None);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let manifest = sample();
        assert!(manifest.extra.contains_key("generatedAt"));

        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["generatedAt"], "2026-02-20T12:00:00Z");
        assert_eq!(value["packs"]["GA"]["contentHash"], "sha256:abc");
        assert!(value["packs"]["wy"].get("contentHash").is_none());
    }
}
