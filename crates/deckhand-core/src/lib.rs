// deckhand-core: session layer between deckhand-api and consumers.
//
// Owns the connection state machine, the adaptive polling loop, and the
// command surface. Consumers hold a `Deck` handle; everything network-
// facing lives behind it.

pub mod command;
pub mod config;
pub mod deck;
pub mod error;
pub mod health;
pub mod model;
pub mod stream;

mod poller;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::TransportCommand;
pub use config::DeckConfig;
pub use deck::Deck;
pub use error::CoreError;
pub use health::ConnectionMonitor;
pub use model::{ConnectionState, DeckEvent, PlaybackState, TransportStatus};
pub use stream::EventStream;

// Re-export the ack type commands resolve to.
pub use deckhand_api::CommandAck;
