//! Schema layer for manifests and state packs.
//!
//! - [`validate`]: structural checks run on every candidate payload (remote,
//!   cached or seed) before it is trusted
//! - [`normalize`]: total migration from any known pack shape into the
//!   canonical [`statepack_types::StatePack`]
//!
//! Validation guards the resolver; normalization guards everything after it.
//! A payload that fails validation is treated as absent and never normalized.

pub mod normalize;
pub mod validate;

pub use normalize::normalize;
pub use validate::{validate_manifest, validate_state_pack, SchemaError};
