//! URL layout of a remote pack source.

/// Base URL of a remote source serving `manifest.json` and `packs/{STATE}.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEndpoints {
    base: String,
}

impl PackEndpoints {
    /// Returns `None` for a blank base URL, meaning no remote is configured.
    pub fn new(base: &str) -> Option<Self> {
        let base = base.trim().trim_end_matches('/');
        if base.is_empty() {
            return None;
        }
        Some(Self {
            base: base.to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn manifest_url(&self) -> String {
        format!("{}/manifest.json", self.base)
    }

    /// URL of a state's pack. The state code is upper-cased.
    pub fn pack_url(&self, state: &str) -> String {
        format!("{}/packs/{}.json", self.base, state.trim().to_uppercase())
    }
}
