//! Query-side status metadata.
//!
//! Statuses are the return-side contract of the resolver and are never
//! persisted. Callers branch on [`PackSource`], `error` and `is_stale`
//! rather than on `Result`s.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manifest::Manifest;
use crate::pack::StatePack;

/// Where a returned pack or manifest came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackSource {
    /// Fetched from the network during this call.
    Remote,
    /// Read from local storage.
    Cache,
    /// Bundled seed data.
    Seed,
    /// Nothing available.
    None,
}

impl fmt::Display for PackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackSource::Remote => write!(f, "remote"),
            PackSource::Cache => write!(f, "cache"),
            PackSource::Seed => write!(f, "seed"),
            PackSource::None => write!(f, "none"),
        }
    }
}

/// Metadata describing how a pack lookup was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackStatus {
    pub state: String,
    pub source: PackSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// When the returned content was fetched or cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// When this lookup ran.
    pub last_tried_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_stale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    /// Outcome of comparing a fetched body against the manifest's `contentHash`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_verified: Option<bool>,
}

impl PackStatus {
    pub fn new(state: impl Into<String>, source: PackSource, tried_at: DateTime<Utc>) -> Self {
        Self {
            state: state.into(),
            source,
            pack_version: None,
            schema_version: None,
            last_fetched_at: None,
            last_tried_at: tried_at,
            error: None,
            is_stale: None,
            cache_key: None,
            content_verified: None,
        }
    }

    /// Copy version fields from the pack being returned.
    pub fn describing(mut self, pack: &StatePack) -> Self {
        self.pack_version = Some(pack.pack_version.clone());
        self.schema_version = Some(pack.schema_version.clone());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Metadata describing how a manifest lookup was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestStatus {
    pub source: PackSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub last_tried_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_stale: Option<bool>,
}

impl ManifestStatus {
    pub fn new(source: PackSource, tried_at: DateTime<Utc>) -> Self {
        Self {
            source,
            schema_version: None,
            last_fetched_at: None,
            last_tried_at: tried_at,
            error: None,
            is_stale: None,
        }
    }
}

/// A pack lookup result: the pack (if any) plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackResult {
    pub pack: Option<StatePack>,
    pub status: PackStatus,
}

impl PackResult {
    /// Human-readable source line, e.g. `cache (v2026.02.20) (baseline) (stale)`.
    ///
    /// Fresh remote data, stale cache, bundled placeholders and "nothing"
    /// always render differently.
    pub fn describe(&self) -> String {
        let status = &self.status;
        if status.source == PackSource::None {
            return match &status.error {
                Some(err) => format!("none ({})", err),
                None => "none".to_string(),
            };
        }
        let mut line = format!(
            "{} (v{})",
            status.source,
            status.pack_version.as_deref().unwrap_or("unknown")
        );
        if self.pack.as_ref().is_some_and(StatePack::is_baseline) {
            line.push_str(" (baseline)");
        }
        if status.is_stale == Some(true) {
            line.push_str(" (stale)");
        }
        line
    }
}

/// A manifest lookup result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestResult {
    pub manifest: Option<Manifest>,
    pub status: ManifestStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::BASELINE_QUALITY;

    fn result(source: PackSource, stale: Option<bool>, quality: Option<&str>) -> PackResult {
        let pack = StatePack {
            state: "WY".to_string(),
            schema_version: "1".to_string(),
            pack_version: "baseline-2026-02-20".to_string(),
            quality: quality.map(str::to_string),
            ..Default::default()
        };
        let mut status = PackStatus::new("WY", source, Utc::now()).describing(&pack);
        status.is_stale = stale;
        PackResult {
            pack: Some(pack),
            status,
        }
    }

    #[test]
    fn test_describe_distinguishes_sources() {
        assert_eq!(
            result(PackSource::Remote, Some(false), None).describe(),
            "remote (vbaseline-2026-02-20)"
        );
        assert_eq!(
            result(PackSource::Cache, Some(true), Some(BASELINE_QUALITY)).describe(),
            "cache (vbaseline-2026-02-20) (baseline) (stale)"
        );
        assert_eq!(
            result(PackSource::Seed, None, Some(BASELINE_QUALITY)).describe(),
            "seed (vbaseline-2026-02-20) (baseline)"
        );

        let none = PackResult {
            pack: None,
            status: PackStatus::new("ZZ", PackSource::None, Utc::now())
                .with_error("no pack available for ZZ"),
        };
        assert_eq!(none.describe(), "none (no pack available for ZZ)");
    }

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(PackSource::Seed).unwrap(),
            serde_json::json!("seed")
        );
        let status = PackStatus::new("GA", PackSource::Cache, Utc::now());
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["source"], "cache");
        assert!(value.get("error").is_none());
        assert!(value.get("lastTriedAt").is_some());
    }
}
