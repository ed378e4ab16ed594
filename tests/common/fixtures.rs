//! Documents used across the resolver tests.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

pub const BASE_URL: &str = "https://packs.test";

/// Fixed epoch for the manual clock.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 20, 0, 0, 0).unwrap()
}

pub fn manifest_url() -> String {
    format!("{}/manifest.json", BASE_URL)
}

pub fn pack_url(state: &str) -> String {
    format!("{}/packs/{}.json", BASE_URL, state)
}

/// Manifest advertising `(state, packVersion)` pairs.
pub fn manifest_doc(entries: &[(&str, &str)]) -> Value {
    let packs: Map<String, Value> = entries
        .iter()
        .map(|(state, version)| (state.to_string(), json!({ "packVersion": version })))
        .collect();
    json!({ "schemaVersion": "1", "packs": packs })
}

/// A generated-style remote pack: nested domain issues, flat issue authorities.
pub fn remote_pack_doc(state: &str, version: &str) -> Value {
    json!({
        "state": state,
        "schemaVersion": "1",
        "packVersion": version,
        "domains": [{
            "id": "custody",
            "label": "Custody",
            "issues": [{
                "id": "custody_initial",
                "label": "Initial Custody Determination",
                "authorities": ["Code § 1"],
                "tests": [{ "id": "best_interest" }]
            }]
        }],
        "issueAuthorities": [
            { "issueId": "custody_initial", "citation": "Code § 1" },
            { "issue": "custody_initial", "authorityCitation": "Case v. Case" }
        ],
        "authorities": {
            "Code § 1": { "kind": "statute", "title": "Code section 1", "rank": "binding" },
            "Case v. Case": { "kind": "case", "source_url": "https://example.org/case" }
        },
        "publishedAt": "2026-02-19"
    })
}
