// deckhand-api: Async Rust client for the deck control REST API (/control/api/v1).

pub mod cache;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod retry;
pub mod transport;
pub mod types;

pub use cache::ResponseCache;
pub use client::{ClientOptions, DeckClient, MAX_SHUTTLE_SPEED, MAX_TRANSPORT_INDEX};
pub use endpoint::DeckEndpoint;
pub use error::Error;
pub use retry::{ErrorKind, RetryDecision, RetryPolicy};
pub use transport::TransportConfig;
pub use types::{CommandAck, DeviceStatus};
