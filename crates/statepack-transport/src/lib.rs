//! Network transport for the pack resolver.
//!
//! This crate provides:
//! - [`PackTransport`]: async byte fetch, the seam the resolver is tested through
//! - [`HttpTransport`]: blocking `ureq` agent driven from a blocking task
//! - [`PackEndpoints`]: URL layout of a remote pack source

pub mod endpoints;
pub mod http;

pub use endpoints::PackEndpoints;
pub use http::HttpTransport;

use anyhow::Result;
use async_trait::async_trait;

/// Fetches raw documents from a remote pack source.
///
/// Implementations return the response body untouched. Non-success statuses,
/// timeouts and connection failures are all errors.
#[async_trait]
pub trait PackTransport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
