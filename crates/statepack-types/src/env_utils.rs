//! Environment variable parsing utilities.
//!
//! Configuration reads every knob through these helpers so that a
//! malformed value falls back to the default instead of failing startup:
//!
//! ```
//! use statepack_types::env_utils::{env_var_or, env_nonempty};
//!
//! let ttl_secs: u64 = env_var_or("STATEPACK_PACK_TTL_SECS", 604_800);
//! let base: Option<String> = env_nonempty("STATEPACK_BASE_URL");
//! ```

use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable with a default value.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Read a string variable, treating unset and whitespace-only values alike.
pub fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check if an environment variable is set to a truthy value, with a default.
///
/// Truthy values are "1", "true", "yes" and "on" (case-insensitive).
pub fn env_bool_or(key: &str, default: bool) -> bool {
    match std::env::var(key).ok() {
        Some(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}
