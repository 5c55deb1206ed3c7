// ── Deck session facade ──
//
// The consumer entry point. Owns the API client, the connection monitor,
// and the background polling task. Cheaply cloneable; every clone shares
// the same session.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use deckhand_api::{CommandAck, DeckClient, DeckEndpoint};

use crate::command::TransportCommand;
use crate::config::DeckConfig;
use crate::error::CoreError;
use crate::health::ConnectionMonitor;
use crate::model::{ConnectionState, DeckEvent};
use crate::poller::{PollerSettings, poll_task};
use crate::stream::EventStream;

const EVENT_CHANNEL_SIZE: usize = 256;

/// Handle to a running deck session.
#[derive(Clone)]
pub struct Deck {
    inner: Arc<DeckInner>,
}

struct DeckInner {
    config: DeckConfig,
    client: Arc<DeckClient>,
    monitor: Arc<ConnectionMonitor>,
    events: broadcast::Sender<DeckEvent>,
    cancel: CancellationToken,
    poll_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Deck {
    /// Open a session: build the client, run the first health check, and
    /// start the polling task.
    ///
    /// Returns `Ok` even when the deck is currently unreachable -- the
    /// session keeps probing and reports reachability through events.
    /// Only a malformed configuration fails construction.
    pub async fn connect(config: DeckConfig) -> Result<Self, CoreError> {
        let endpoint = DeckEndpoint::parse(&config.endpoint)?;
        let client = Arc::new(DeckClient::new(endpoint, &config.client_options())?);

        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let monitor = Arc::new(ConnectionMonitor::new(
            Arc::clone(&client),
            events.clone(),
            config.health_check_window,
            config.disconnect_threshold,
        ));

        let deck = Self {
            inner: Arc::new(DeckInner {
                client,
                monitor,
                events,
                cancel: CancellationToken::new(),
                poll_handle: Mutex::new(None),
                config,
            }),
        };

        // Establish reachability before the caller sees the handle.
        deck.inner.monitor.force_check().await;

        let settings = PollerSettings {
            transport_index: deck.inner.config.transport_index,
            interval_connected: deck.inner.config.poll_interval,
            interval_disconnected: deck.inner.config.poll_interval_disconnected,
        };
        let handle = tokio::spawn(poll_task(
            Arc::clone(&deck.inner.client),
            Arc::clone(&deck.inner.monitor),
            deck.inner.events.clone(),
            settings,
            deck.inner.cancel.clone(),
        ));
        *deck.inner.poll_handle.lock().await = Some(handle);

        info!(
            endpoint = %deck.inner.client.endpoint(),
            state = %deck.inner.monitor.current(),
            "deck session started"
        );
        Ok(deck)
    }

    /// The session configuration.
    pub fn config(&self) -> &DeckConfig {
        &self.inner.config
    }

    // ── State observation ────────────────────────────────────────────

    /// Current connection state, non-blocking.
    pub fn state(&self) -> ConnectionState {
        self.inner.monitor.current()
    }

    /// Run a health check now if the cached one has lapsed, returning
    /// the (possibly updated) state. May block up to the request timeout.
    pub async fn check_now(&self) -> ConnectionState {
        self.inner.monitor.check_now().await
    }

    /// Subscribe to poll results and connection transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<DeckEvent> {
        self.inner.events.subscribe()
    }

    /// Subscribe as a `Stream`.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.inner.events.subscribe())
    }

    /// Watch connection state changes only.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.monitor.watch()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Execute a transport command against the configured transport.
    ///
    /// Validation failures never reach the network. Device rejections
    /// come back as [`CoreError::Rejected`]; the session survives either
    /// way, and the next poll refetches fresh state.
    pub async fn execute(&self, command: TransportCommand) -> Result<CommandAck, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Shutdown);
        }
        command.validate()?;

        let index = self.inner.config.transport_index;
        let ack = match &command {
            TransportCommand::Play => self.inner.client.play(index).await?,
            TransportCommand::Stop => self.inner.client.stop(index).await?,
            TransportCommand::Record { clip_name } => {
                self.inner.client.record(index, clip_name.as_deref()).await?
            }
            TransportCommand::Shuttle { speed } => {
                self.inner.client.shuttle(index, *speed).await?
            }
        };

        debug!(?command, "command acknowledged");
        Ok(ack)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Stop polling and release the connection.
    ///
    /// Idempotent and safe to call from any task. No new tick starts
    /// after cancellation; an in-flight tick completes first.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.poll_handle.lock().await.take() {
            let _ = handle.await;
        }
        self.inner.monitor.mark_shutdown();
        debug!("deck session shut down");
    }
}
