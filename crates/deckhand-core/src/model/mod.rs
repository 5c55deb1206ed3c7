// ── Domain model ──
//
// Value types shared between the monitor, the poller, and consumers.

mod event;
mod state;
mod status;

pub use event::DeckEvent;
pub use state::{ConnectionState, PlaybackState};
pub use status::TransportStatus;
