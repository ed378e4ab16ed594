//! Scripted transport.
//!
//! Routes map a URL to a canned body or a failure. Unknown URLs fail like a
//! 404. Every call is recorded so tests can assert on network traffic.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use statepack::transport::PackTransport;

#[derive(Debug, Clone)]
enum Route {
    Body(Vec<u8>),
    Fail(String),
}

#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(&self, url: &str, value: &Value) {
        self.respond_raw(url, serde_json::to_vec(value).unwrap());
    }

    pub fn respond_raw(&self, url: &str, body: Vec<u8>) {
        self.routes.lock().insert(url.to_string(), Route::Body(body));
    }

    pub fn fail(&self, url: &str, message: &str) {
        self.routes
            .lock()
            .insert(url.to_string(), Route::Fail(message.to_string()));
    }

    /// Delay every response, so concurrent callers overlap.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl PackTransport for MockTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.lock().push(url.to_string());
        // the response is fixed when the request starts
        let route = self.routes.lock().get(url).cloned();
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match route {
            Some(Route::Body(body)) => Ok(body),
            Some(Route::Fail(message)) => Err(anyhow!("Failed to fetch {}: {}", url, message)),
            None => Err(anyhow!("Failed to fetch {}: status code 404", url)),
        }
    }
}
