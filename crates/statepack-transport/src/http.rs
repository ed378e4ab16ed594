//! `ureq`-backed transport.

use std::io::Read;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::PackTransport;

/// HTTP transport with a per-request timeout.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

impl HttpTransport {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(timeout)
            .build();
        Self { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Blocking GET returning the body bytes.
    pub fn fetch_blocking(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .agent
            .get(url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| anyhow!("Failed to fetch {}: {}", url, e))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| anyhow!("Failed to read response body from {}: {}", url, e))?;

        debug!(url, bytes = bytes.len(), "fetched remote document");
        Ok(bytes)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl PackTransport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let transport = self.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || transport.fetch_blocking(&url))
            .await
            .map_err(|e| anyhow!("Fetch task failed: {}", e))?
    }
}
