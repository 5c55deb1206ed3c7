// Shared transport configuration for building the persistent reqwest::Client.
//
// The client is built once per deck session and reused for every request,
// so the underlying connection stays pooled instead of being reopened
// per call.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::Error;

/// Client identification sent on every request.
pub const USER_AGENT: &str = concat!("deckhand/", env!("CARGO_PKG_VERSION"));

/// Transport tuning for the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout (connect + read).
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(2500),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with the deck's default headers.
    ///
    /// Every request carries `Accept: application/json` and a stable
    /// client identification header.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}
