//! Pack normalization.
//!
//! [`normalize`] is the migration function from every pack shape seen in the
//! wild into the canonical schema-1 [`StatePack`]:
//!
//! | Concern | Accepted sources (first match wins) | Canonical |
//! |---------|-------------------------------------|-----------|
//! | legal tests | `legalTests`, `tests`, `legal_tests` | `legalTests` |
//! | procedural traps | `traps`, `proceduralTraps`, `procedural_traps` | `traps` |
//! | issue -> citations | `authoritiesByIssue`, flat `issueAuthorities`, nested issue `authorities` | `authoritiesByIssue` |
//! | forms (per issue) | `formsAndGuides`, `forms_and_guides` | `formsAndGuides` |
//!
//! The function is total: anything that is not an object becomes an empty
//! pack, scalars are coerced to strings, and wrong container kinds fall back
//! to empty defaults. Fields it does not recognize are carried through in the
//! `extra` maps, and so are non-canonical aliases that lost to another alias.
//! Normalizing a normalized pack is a no-op.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use statepack_types::{
    normalize_state_code, Authority, Domain, Issue, StatePack, CURRENT_SCHEMA_VERSION,
    DEFAULT_PACK_VERSION,
};

const LEGAL_TEST_FIELDS: &[&str] = &["legalTests", "tests", "legal_tests"];
const TRAP_FIELDS: &[&str] = &["traps", "proceduralTraps", "procedural_traps"];
const FORM_FIELDS: &[&str] = &["formsAndGuides", "forms_and_guides"];

const PACK_FIELDS: &[&str] = &[
    "state",
    "schemaVersion",
    "packVersion",
    "pack_version",
    "quality",
    "domains",
    "issues",
    "authorities",
    "authoritiesByIssue",
    "issueAuthorities",
    "intakeQuestions",
    "testItems",
    "gaps",
];
const DOMAIN_FIELDS: &[&str] = &["id", "label", "issues"];
const ISSUE_FIELDS: &[&str] = &["id", "label", "domainId", "domain_id", "authorities"];
const AUTHORITY_FIELDS: &[&str] = &[
    "kind",
    "title",
    "rank",
    "courtScope",
    "court_scope",
    "sources",
    "source_url",
    "sourceUrl",
];

/// Migrate a raw pack payload into the canonical shape.
pub fn normalize(raw: &Value) -> StatePack {
    let Some(obj) = raw.as_object() else {
        return StatePack {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            pack_version: DEFAULT_PACK_VERSION.to_string(),
            ..Default::default()
        };
    };

    let domains: Vec<Domain> = objects(obj.get("domains"))
        .map(normalize_domain)
        .collect();
    let issues: Vec<Issue> = objects(obj.get("issues")).map(normalize_issue).collect();

    let authorities = match obj.get("authorities") {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(citation, meta)| (citation.clone(), normalize_authority(meta)))
            .collect(),
        _ => BTreeMap::new(),
    };

    let authorities_by_issue = canonical_authorities_by_issue(obj, &domains, &issues);
    let (legal_tests, legal_tests_from) = first_array(obj, LEGAL_TEST_FIELDS);
    let (traps, traps_from) = first_array(obj, TRAP_FIELDS);

    StatePack {
        state: coerce_string(obj.get("state"))
            .map(|s| normalize_state_code(&s))
            .unwrap_or_default(),
        schema_version: coerce_string(obj.get("schemaVersion"))
            .unwrap_or_else(|| CURRENT_SCHEMA_VERSION.to_string()),
        pack_version: first_string(obj, &["packVersion", "pack_version"])
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PACK_VERSION.to_string()),
        quality: coerce_string(obj.get("quality")),
        domains,
        issues,
        authorities,
        authorities_by_issue,
        legal_tests,
        traps,
        intake_questions: first_array(obj, &["intakeQuestions"]).0,
        test_items: first_array(obj, &["testItems"]).0,
        gaps: first_array(obj, &["gaps"]).0,
        extra: leftovers(
            obj,
            &[
                PACK_FIELDS,
                consumed(LEGAL_TEST_FIELDS, legal_tests_from).as_slice(),
                consumed(TRAP_FIELDS, traps_from).as_slice(),
            ],
        ),
    }
}

fn normalize_domain(obj: &Map<String, Value>) -> Domain {
    Domain {
        id: coerce_string(obj.get("id")).unwrap_or_default(),
        label: coerce_string(obj.get("label")).unwrap_or_default(),
        issues: objects(obj.get("issues")).map(normalize_issue).collect(),
        extra: leftovers(obj, &[DOMAIN_FIELDS]),
    }
}

fn normalize_issue(obj: &Map<String, Value>) -> Issue {
    let (legal_tests, legal_tests_from) = first_array(obj, LEGAL_TEST_FIELDS);
    let (traps, traps_from) = first_array(obj, TRAP_FIELDS);
    let (forms, forms_from) = first_array(obj, FORM_FIELDS);
    Issue {
        id: coerce_string(obj.get("id")).unwrap_or_default(),
        label: coerce_string(obj.get("label")).unwrap_or_default(),
        domain_id: first_string(obj, &["domainId", "domain_id"]),
        authorities: strings(obj.get("authorities")),
        legal_tests,
        traps,
        forms_and_guides: forms.iter().filter_map(|v| coerce_string(Some(v))).collect(),
        extra: leftovers(
            obj,
            &[
                ISSUE_FIELDS,
                consumed(LEGAL_TEST_FIELDS, legal_tests_from).as_slice(),
                consumed(TRAP_FIELDS, traps_from).as_slice(),
                consumed(FORM_FIELDS, forms_from).as_slice(),
            ],
        ),
    }
}

fn normalize_authority(raw: &Value) -> Authority {
    let Some(obj) = raw.as_object() else {
        return Authority::default();
    };

    let mut sources = strings(obj.get("sources"));
    if let Some(url) = first_string(obj, &["source_url", "sourceUrl"]) {
        if !sources.contains(&url) {
            sources.push(url);
        }
    }

    Authority {
        kind: coerce_string(obj.get("kind")),
        title: coerce_string(obj.get("title")),
        rank: coerce_string(obj.get("rank")),
        court_scope: first_string(obj, &["courtScope", "court_scope"]),
        sources,
        extra: leftovers(obj, &[AUTHORITY_FIELDS]),
    }
}

/// Pick exactly one issue -> citations mapping.
fn canonical_authorities_by_issue(
    obj: &Map<String, Value>,
    domains: &[Domain],
    issues: &[Issue],
) -> BTreeMap<String, Vec<String>> {
    if let Some(Value::Object(supplied)) = obj.get("authoritiesByIssue") {
        return supplied
            .iter()
            .map(|(issue, citations)| (issue.clone(), strings(Some(citations))))
            .collect();
    }

    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(Value::Array(links)) = obj.get("issueAuthorities") {
        for link in links.iter().filter_map(Value::as_object) {
            let issue = first_string(link, &["issueId", "issue"]).unwrap_or_default();
            let citation =
                first_string(link, &["authorityCitation", "citation"]).unwrap_or_default();
            if issue.is_empty() || citation.is_empty() {
                continue;
            }
            push_unique(map.entry(issue).or_default(), citation);
        }
        return map;
    }

    let nested = domains.iter().flat_map(|d| d.issues.iter()).chain(issues);
    for issue in nested {
        if issue.id.is_empty() || issue.authorities.is_empty() {
            continue;
        }
        let entry = map.entry(issue.id.clone()).or_default();
        for citation in &issue.authorities {
            push_unique(entry, citation.clone());
        }
    }
    map
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Render a scalar as a string. Containers and null yield `None`.
fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_string(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| coerce_string(obj.get(*name)))
}

/// The first alias holding an array, plus the name it was read from.
fn first_array<'n>(
    obj: &Map<String, Value>,
    names: &[&'n str],
) -> (Vec<Value>, Option<&'n str>) {
    names
        .iter()
        .find_map(|name| {
            let items = obj.get(*name).and_then(Value::as_array)?;
            Some((items.clone(), Some(*name)))
        })
        .unwrap_or_default()
}

/// Alias names not to carry in `extra`: the canonical name (listed first)
/// and the alias that was read.
fn consumed<'n>(aliases: &[&'n str], winner: Option<&'n str>) -> Vec<&'n str> {
    aliases
        .iter()
        .take(1)
        .copied()
        .chain(winner)
        .collect()
}

fn strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| coerce_string(Some(v))).collect(),
        _ => Vec::new(),
    }
}

fn objects(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn leftovers(obj: &Map<String, Value>, known: &[&[&str]]) -> Map<String, Value> {
    obj.iter()
        .filter(|(key, _)| !known.iter().any(|set| set.contains(&key.as_str())))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
