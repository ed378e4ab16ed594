#![allow(dead_code, unused_imports)]
//! Shared test utilities for integration tests.
//!
//! - `mocks`: scripted in-process transport
//! - `fixtures`: manifest and pack documents, clock epoch
//! - `setup`: resolver harness wiring a memory store, mock transport and manual clock

pub mod fixtures;
pub mod mocks;
pub mod setup;

pub use fixtures::{manifest_doc, manifest_url, pack_url, remote_pack_doc, t0, BASE_URL};
pub use mocks::MockTransport;
pub use setup::Harness;
