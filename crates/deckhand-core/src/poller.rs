// ── Status polling loop ──
//
// One background task per deck session. Cadence follows the connection
// state: fast while the deck is reachable, slow while it is not, so an
// unplugged deck does not flood the network or the logs. A failed tick
// is reported and rescheduled, never fatal; only cancellation stops the
// loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use deckhand_api::DeckClient;

use crate::error::CoreError;
use crate::health::ConnectionMonitor;
use crate::model::{ConnectionState, DeckEvent, TransportStatus};

#[derive(Debug, Clone, Copy)]
pub(crate) struct PollerSettings {
    pub transport_index: u8,
    pub interval_connected: Duration,
    pub interval_disconnected: Duration,
}

/// Pick the sleep for the next tick from the current connection state.
pub(crate) fn interval_for(state: ConnectionState, settings: &PollerSettings) -> Duration {
    if state.is_reachable() {
        settings.interval_connected
    } else {
        settings.interval_disconnected
    }
}

/// Repeating poll loop. Runs until the token is cancelled; no new tick
/// starts after cancellation, and the in-flight tick is allowed to
/// finish.
pub(crate) async fn poll_task(
    client: Arc<DeckClient>,
    monitor: Arc<ConnectionMonitor>,
    events: broadcast::Sender<DeckEvent>,
    settings: PollerSettings,
    cancel: CancellationToken,
) {
    loop {
        // Recomputed every iteration, so the cadence switches within one
        // tick of a state change.
        let interval = interval_for(monitor.current(), &settings);

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }

        tick(&client, &monitor, &events, settings.transport_index).await;
    }

    debug!("poller stopped");
}

/// One tick: refresh reachability if the cached probe lapsed, then try a
/// status read and report the outcome.
async fn tick(
    client: &DeckClient,
    monitor: &ConnectionMonitor,
    events: &broadcast::Sender<DeckEvent>,
    index: u8,
) {
    let connection = monitor.check_now().await;

    match fetch_status(client, index).await {
        Ok(status) => {
            let _ = events.send(DeckEvent::Status {
                connection,
                status: Arc::new(status),
            });
        }
        Err(err) => {
            warn!(error = %err, "status poll failed");
            let _ = events.send(DeckEvent::StatusUnavailable {
                connection,
                reason: err.to_string(),
            });
        }
    }
}

async fn fetch_status(client: &DeckClient, index: u8) -> Result<TransportStatus, CoreError> {
    let payload = client.get_transport(index).await?;
    // Clip lookup is best-effort: a deck without clip endpoints still
    // yields a usable snapshot.
    let clip = client.get_active_clip(index).await.unwrap_or_default();
    Ok(TransportStatus::from_payload(index, payload, clip.as_ref()))
}
