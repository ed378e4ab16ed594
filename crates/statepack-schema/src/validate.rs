//! Structural validation.
//!
//! Checks only presence and primitive type of the fields the resolver and
//! normalizer depend on. Citation cross-references are not checked.

use serde_json::{Map, Value};

/// Why a payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{0} is not a JSON object")]
    NotAnObject(String),

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{path}` must be {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("field `{0}` must not be empty")]
    EmptyField(String),
}

/// Validate a manifest candidate.
pub fn validate_manifest(candidate: &Value) -> Result<(), SchemaError> {
    let root = as_object(candidate, "manifest")?;
    require_string(root, "", "schemaVersion")?;

    let packs = root
        .get("packs")
        .ok_or_else(|| SchemaError::MissingField("packs".to_string()))?;
    let packs = packs.as_object().ok_or_else(|| SchemaError::WrongType {
        path: "packs".to_string(),
        expected: "an object",
    })?;

    for (state, entry) in packs {
        let prefix = format!("packs.{}", state);
        let entry = as_object(entry, &prefix)?;
        let version = require_string(entry, &prefix, "packVersion")?;
        if version.trim().is_empty() {
            return Err(SchemaError::EmptyField(join(&prefix, "packVersion")));
        }
        if let Some(hash) = optional_string(entry, &prefix, "contentHash")? {
            if hash.trim().is_empty() {
                return Err(SchemaError::EmptyField(join(&prefix, "contentHash")));
            }
        }
    }
    Ok(())
}

/// Validate a state pack candidate (raw, pre-normalization shape).
pub fn validate_state_pack(candidate: &Value) -> Result<(), SchemaError> {
    let root = as_object(candidate, "pack")?;
    require_string(root, "", "schemaVersion")?;

    match root.get("domains") {
        None => return Err(SchemaError::MissingField("domains".to_string())),
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(SchemaError::WrongType {
                path: "domains".to_string(),
                expected: "an array",
            })
        }
    }
    match root.get("authorities") {
        None => return Err(SchemaError::MissingField("authorities".to_string())),
        Some(Value::Object(_)) => {}
        Some(_) => {
            return Err(SchemaError::WrongType {
                path: "authorities".to_string(),
                expected: "an object",
            })
        }
    }

    for field in ["state", "packVersion", "quality"] {
        optional_string(root, "", field)?;
    }
    for field in [
        "issues",
        "issueAuthorities",
        "legalTests",
        "tests",
        "traps",
        "proceduralTraps",
    ] {
        optional_array(root, field)?;
    }
    if let Some(map) = root.get("authoritiesByIssue") {
        if !map.is_object() {
            return Err(SchemaError::WrongType {
                path: "authoritiesByIssue".to_string(),
                expected: "an object",
            });
        }
    }
    Ok(())
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::NotAnObject(what.to_string()))
}

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn require_string<'a>(
    obj: &'a Map<String, Value>,
    prefix: &str,
    field: &str,
) -> Result<&'a str, SchemaError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(SchemaError::MissingField(join(prefix, field))),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(SchemaError::WrongType {
            path: join(prefix, field),
            expected: "a string",
        }),
    }
}

fn optional_string<'a>(
    obj: &'a Map<String, Value>,
    prefix: &str,
    field: &str,
) -> Result<Option<&'a str>, SchemaError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(SchemaError::WrongType {
            path: join(prefix, field),
            expected: "a string",
        }),
    }
}

fn optional_array(obj: &Map<String, Value>, field: &str) -> Result<(), SchemaError> {
    match obj.get(field) {
        None | Some(Value::Null) | Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(SchemaError::WrongType {
            path: field.to_string(),
            expected: "an array",
        }),
    }
}
