// ── Runtime session configuration ──
//
// Describes *how* to reach and poll a deck. Built by the consumer and
// handed to `Deck::connect` -- the core never reads config files and
// never persists anything.

use std::time::Duration;

use deckhand_api::{ClientOptions, RetryPolicy, TransportConfig};

/// Configuration for a single deck session.
#[derive(Debug, Clone)]
pub struct DeckConfig {
    /// Deck address: bare host, `host:port`, or full URL.
    pub endpoint: String,
    /// Transport sub-unit to poll and command (0-7).
    pub transport_index: u8,
    /// Poll cadence while the deck is reachable.
    pub poll_interval: Duration,
    /// Poll cadence while the deck is unreachable; slower, to cut load
    /// and log noise.
    pub poll_interval_disconnected: Duration,
    /// How long a health-check result stays valid before the next probe.
    pub health_check_window: Duration,
    /// Consecutive failed probes before Degraded collapses to
    /// Disconnected.
    pub disconnect_threshold: u32,
    /// Response cache time-to-live.
    pub cache_ttl: Duration,
    /// Response cache entry bound (LRU beyond this).
    pub cache_capacity: usize,
    /// Retry ceiling, including the first attempt.
    pub retry_max_attempts: u32,
    /// Backoff base delay.
    pub retry_base_delay: Duration,
    /// Backoff cap.
    pub retry_max_delay: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            endpoint: "192.168.1.100".into(),
            transport_index: 0,
            poll_interval: Duration::from_secs(1),
            poll_interval_disconnected: Duration::from_secs(5),
            health_check_window: Duration::from_secs(5),
            disconnect_threshold: 3,
            cache_ttl: Duration::from_millis(500),
            cache_capacity: 64,
            retry_max_attempts: 3,
            retry_base_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(8),
            request_timeout: Duration::from_millis(2500),
        }
    }
}

impl DeckConfig {
    /// Convenience: default tuning against the given address.
    pub fn for_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Lower the API client options out of the session config.
    pub(crate) fn client_options(&self) -> ClientOptions {
        ClientOptions {
            transport: TransportConfig {
                timeout: self.request_timeout,
            },
            retry: RetryPolicy {
                max_attempts: self.retry_max_attempts,
                base_delay: self.retry_base_delay,
                max_delay: self.retry_max_delay,
            },
            cache_ttl: self.cache_ttl,
            cache_capacity: self.cache_capacity,
        }
    }
}
