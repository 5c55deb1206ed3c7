// ── Connection monitor ──
//
// Owns the deck's reachability state machine. Probe errors are never
// propagated upward; they become state transitions. Consumers observe the
// state through a watch channel and the session event broadcast.
//
// Lock discipline: the probe bookkeeping mutex guards in-memory state
// only -- it is never held across the network round trip.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use deckhand_api::DeckClient;

use crate::model::{ConnectionState, DeckEvent};

/// Cached outcome of the last health probe.
#[derive(Debug, Default)]
struct ProbeWindow {
    last_checked: Option<Instant>,
    consecutive_failures: u32,
}

/// Tracks whether the deck is reachable.
///
/// A health check is a lightweight status read through the client.
/// Results are cached for a validity window so rapid consecutive callers
/// (status bars, command pre-checks) do not each trigger a round trip.
pub struct ConnectionMonitor {
    client: Arc<DeckClient>,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<DeckEvent>,
    probe: Mutex<ProbeWindow>,
    window: Duration,
    disconnect_threshold: u32,
}

impl ConnectionMonitor {
    pub fn new(
        client: Arc<DeckClient>,
        events: broadcast::Sender<DeckEvent>,
        window: Duration,
        disconnect_threshold: u32,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Unknown);
        Self {
            client,
            state,
            events,
            probe: Mutex::new(ProbeWindow::default()),
            window,
            disconnect_threshold: disconnect_threshold.max(1),
        }
    }

    /// Last known state, without touching the network.
    pub fn current(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Whether the cached probe result has lapsed.
    pub fn check_due(&self) -> bool {
        let probe = self.probe.lock().expect("probe lock poisoned");
        probe
            .last_checked
            .is_none_or(|at| at.elapsed() >= self.window)
    }

    /// Run a health check if the cached result has lapsed.
    ///
    /// Returns the (possibly updated) state. May block on the network up
    /// to the transport timeout.
    pub async fn check_now(&self) -> ConnectionState {
        if !self.check_due() {
            debug!(state = %self.current(), "health check still fresh");
            return self.current();
        }
        self.force_check().await
    }

    /// Run a health check unconditionally.
    pub async fn force_check(&self) -> ConnectionState {
        if self.current() == ConnectionState::Unknown {
            self.transition(ConnectionState::Connecting);
        }

        let outcome = self.client.health_check().await;

        let next = {
            let mut probe = self.probe.lock().expect("probe lock poisoned");
            probe.last_checked = Some(Instant::now());
            match outcome {
                Ok(()) => {
                    probe.consecutive_failures = 0;
                    ConnectionState::Connected
                }
                Err(err) => {
                    probe.consecutive_failures = probe.consecutive_failures.saturating_add(1);
                    let failures = probe.consecutive_failures;
                    debug!(error = %err, failures, "health check failed");
                    match self.current() {
                        ConnectionState::Connected | ConnectionState::Degraded
                            if failures < self.disconnect_threshold =>
                        {
                            ConnectionState::Degraded
                        }
                        _ => ConnectionState::Disconnected,
                    }
                }
            }
        };

        self.transition(next);
        next
    }

    /// Mark the session closed.
    pub(crate) fn mark_shutdown(&self) {
        self.transition(ConnectionState::Disconnected);
    }

    /// Publish a state change. Same-state re-confirmations send nothing,
    /// so subscribers never see two identical consecutive transitions.
    fn transition(&self, next: ConnectionState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            info!(state = %next, "connection state changed");
            let _ = self.events.send(DeckEvent::Connection(next));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use deckhand_api::{ClientOptions, DeckEndpoint, RetryPolicy, TransportConfig};

    fn probe_options() -> ClientOptions {
        ClientOptions {
            transport: TransportConfig {
                timeout: Duration::from_millis(500),
            },
            // Single attempt: the monitor interprets failures, retry noise
            // would only slow the tests down.
            retry: RetryPolicy {
                max_attempts: 1,
                base_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(10),
            },
            cache_ttl: Duration::ZERO,
            cache_capacity: 4,
        }
    }

    async fn monitor_against(
        server: &MockServer,
        window: Duration,
        threshold: u32,
    ) -> (ConnectionMonitor, broadcast::Receiver<DeckEvent>) {
        let endpoint = DeckEndpoint::parse(&server.uri()).unwrap();
        let client = Arc::new(DeckClient::new(endpoint, &probe_options()).unwrap());
        let (events, rx) = broadcast::channel(32);
        (
            ConnectionMonitor::new(client, events, window, threshold),
            rx,
        )
    }

    fn drain_transitions(rx: &mut broadcast::Receiver<DeckEvent>) -> Vec<ConnectionState> {
        let mut states = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let DeckEvent::Connection(state) = event {
                states.push(state);
            }
        }
        states
    }

    fn status_mock(status: u16, times: u64) -> Mock {
        Mock::given(method("GET"))
            .and(path("/control/api/v1/status"))
            .respond_with(if status == 200 {
                ResponseTemplate::new(200).set_body_json(json!({"status": "ok"}))
            } else {
                ResponseTemplate::new(status)
            })
            .up_to_n_times(times)
    }

    #[tokio::test]
    async fn first_success_reaches_connected() {
        let server = MockServer::start().await;
        status_mock(200, 1).mount(&server).await;

        let (monitor, mut rx) = monitor_against(&server, Duration::ZERO, 3).await;
        assert_eq!(monitor.current(), ConnectionState::Unknown);

        let state = monitor.check_now().await;
        assert_eq!(state, ConnectionState::Connected);
        assert_eq!(
            drain_transitions(&mut rx),
            vec![ConnectionState::Connecting, ConnectionState::Connected]
        );
    }

    #[tokio::test]
    async fn blip_degrades_then_threshold_disconnects() {
        let server = MockServer::start().await;
        status_mock(200, 1).mount(&server).await;
        status_mock(500, 10).mount(&server).await;

        let (monitor, mut rx) = monitor_against(&server, Duration::ZERO, 3).await;

        assert_eq!(monitor.force_check().await, ConnectionState::Connected);
        assert_eq!(monitor.force_check().await, ConnectionState::Degraded);
        assert_eq!(monitor.force_check().await, ConnectionState::Degraded);
        assert_eq!(monitor.force_check().await, ConnectionState::Disconnected);

        // No duplicate Degraded event for the re-confirmation.
        assert_eq!(
            drain_transitions(&mut rx),
            vec![
                ConnectionState::Connecting,
                ConnectionState::Connected,
                ConnectionState::Degraded,
                ConnectionState::Disconnected,
            ]
        );
    }

    #[tokio::test]
    async fn failure_without_prior_connection_goes_straight_to_disconnected() {
        let server = MockServer::start().await;
        status_mock(500, 10).mount(&server).await;

        let (monitor, mut rx) = monitor_against(&server, Duration::ZERO, 3).await;

        assert_eq!(monitor.check_now().await, ConnectionState::Disconnected);
        assert_eq!(
            drain_transitions(&mut rx),
            vec![ConnectionState::Connecting, ConnectionState::Disconnected]
        );
    }

    #[tokio::test]
    async fn probe_result_cached_within_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/control/api/v1/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let (monitor, _rx) = monitor_against(&server, Duration::from_secs(60), 3).await;

        assert_eq!(monitor.check_now().await, ConnectionState::Connected);
        // Second call inside the window must not touch the network.
        assert_eq!(monitor.check_now().await, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let server = MockServer::start().await;
        status_mock(200, 1).mount(&server).await;
        status_mock(500, 2).mount(&server).await;
        status_mock(200, 1).mount(&server).await;
        status_mock(500, 1).mount(&server).await;

        let (monitor, _rx) = monitor_against(&server, Duration::ZERO, 3).await;

        assert_eq!(monitor.force_check().await, ConnectionState::Connected);
        assert_eq!(monitor.force_check().await, ConnectionState::Degraded);
        assert_eq!(monitor.force_check().await, ConnectionState::Degraded);
        assert_eq!(monitor.force_check().await, ConnectionState::Connected);
        // The counter restarted: one failure is a blip again, not a drop.
        assert_eq!(monitor.force_check().await, ConnectionState::Degraded);
    }
}
