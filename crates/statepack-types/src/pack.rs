//! Canonical state pack (schema version 1).
//!
//! Pack producers disagree on field names (`tests` vs `legalTests`,
//! `proceduralTraps` vs `traps`, flat `issueAuthorities` vs a keyed
//! `authoritiesByIssue`). The normalizer in `statepack-schema` migrates every
//! known shape into this one; everything downstream only ever sees
//! [`StatePack`].
//!
//! Fields the model does not name are kept in the `extra` maps so that a
//! normalized pack never loses publisher data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema generation this client normalizes into.
pub const CURRENT_SCHEMA_VERSION: &str = "1";

/// Pack version used when a source omits one.
pub const DEFAULT_PACK_VERSION: &str = "unknown";

/// `quality` marker for placeholder packs without curated content.
pub const BASELINE_QUALITY: &str = "baseline";

/// Full legal-content payload for one state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePack {
    /// Two-letter state code.
    pub state: String,
    pub schema_version: String,
    pub pack_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    /// Top-level topic groupings, in publisher order.
    #[serde(default)]
    pub domains: Vec<Domain>,
    /// Issues published flat rather than nested under a domain.
    #[serde(default)]
    pub issues: Vec<Issue>,

    /// Citation -> authority metadata.
    #[serde(default)]
    pub authorities: BTreeMap<String, Authority>,
    /// Issue id -> citations, in first-seen order.
    #[serde(default)]
    pub authorities_by_issue: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub legal_tests: Vec<Value>,
    #[serde(default)]
    pub traps: Vec<Value>,
    #[serde(default)]
    pub intake_questions: Vec<Value>,
    #[serde(default)]
    pub test_items: Vec<Value>,
    #[serde(default)]
    pub gaps: Vec<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A legal topic grouping (custody, support, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single legal issue within a domain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub label: String,
    /// Owning domain, for issues published at the top level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Citations relevant to this issue.
    #[serde(default)]
    pub authorities: Vec<String>,
    #[serde(default)]
    pub legal_tests: Vec<Value>,
    #[serde(default)]
    pub traps: Vec<Value>,
    #[serde(default)]
    pub forms_and_guides: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metadata for a citable legal source (statute, rule or case).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authority {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// binding / persuasive / secondary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_scope: Option<String>,
    /// Provenance URLs.
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatePack {
    /// Whether this is a placeholder pack with no curated content.
    pub fn is_baseline(&self) -> bool {
        self.quality.as_deref() == Some(BASELINE_QUALITY)
    }

    /// Every issue in the pack: domain-nested issues first, then top-level ones.
    pub fn all_issues(&self) -> impl Iterator<Item = &Issue> {
        self.domains
            .iter()
            .flat_map(|d| d.issues.iter())
            .chain(self.issues.iter())
    }

    /// Find an issue by id anywhere in the pack.
    pub fn issue(&self, issue_id: &str) -> Option<&Issue> {
        self.all_issues().find(|i| i.id == issue_id)
    }

    /// Citations for an issue paired with their metadata.
    ///
    /// Citations without an entry in `authorities` are returned with `None`;
    /// producers do not guarantee the cross-reference.
    pub fn authorities_for(&self, issue_id: &str) -> Vec<(&str, Option<&Authority>)> {
        self.authorities_by_issue
            .get(issue_id)
            .map(|citations| {
                citations
                    .iter()
                    .map(|c| (c.as_str(), self.authorities.get(c)))
                    .collect()
            })
            .unwrap_or_default()
    }
}
