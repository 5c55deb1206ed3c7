// ── Consumer-facing events ──

use std::sync::Arc;

use serde::Serialize;

use super::{ConnectionState, TransportStatus};

/// Events delivered to subscribers of a deck session.
///
/// Connection transitions are emitted exactly once per change; poll
/// results arrive at the cadence of the polling loop, carrying the
/// connection state observed at poll time.
#[derive(Debug, Clone, Serialize)]
pub enum DeckEvent {
    /// Connection state changed.
    Connection(ConnectionState),
    /// A status poll succeeded.
    Status {
        connection: ConnectionState,
        status: Arc<TransportStatus>,
    },
    /// A status poll failed; the deck may be unreachable or rebooting.
    /// The loop keeps running -- this is a report, not a fault.
    StatusUnavailable {
        connection: ConnectionState,
        reason: String,
    },
}
