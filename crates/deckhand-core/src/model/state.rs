// ── Connection and playback state enums ──

use serde::{Deserialize, Serialize};

/// Reachability of the deck, owned by the connection monitor.
///
/// Transitions happen only on health-check outcomes; consumers read the
/// latest value and subscribe to changes, they never write it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConnectionState {
    /// No health check has completed yet.
    Unknown,
    /// First health check is in flight.
    Connecting,
    Connected,
    /// A transient blip while previously connected -- not yet declared
    /// dead, so brief drops do not flap consumers.
    Degraded,
    Disconnected,
}

impl ConnectionState {
    /// Whether the deck is worth polling at the fast cadence.
    pub fn is_reachable(self) -> bool {
        matches!(self, Self::Connected | Self::Degraded)
    }
}

/// What a transport sub-unit is doing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlaybackState {
    Play,
    Stop,
    Record,
    Shuttle,
    /// The payload carried no recognizable state.
    Unknown,
}

impl PlaybackState {
    /// Parse a state string from the wire, tolerating firmware spelling
    /// variations ("Recording", "InputRecord", "stopped", "Jog", ...).
    pub(crate) fn from_wire(raw: &str) -> Option<Self> {
        let s = raw.trim().to_ascii_lowercase();
        if s.is_empty() {
            return None;
        }
        if s.contains("record") {
            Some(Self::Record)
        } else if s.contains("shuttle") || s.contains("jog") {
            Some(Self::Shuttle)
        } else if s.contains("play") {
            Some(Self::Play)
        } else if s.contains("stop") {
            Some(Self::Stop)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reachable_states() {
        assert!(ConnectionState::Connected.is_reachable());
        assert!(ConnectionState::Degraded.is_reachable());
        assert!(!ConnectionState::Disconnected.is_reachable());
        assert!(!ConnectionState::Unknown.is_reachable());
        assert!(!ConnectionState::Connecting.is_reachable());
    }

    #[test]
    fn playback_from_wire_variants() {
        assert_eq!(PlaybackState::from_wire("play"), Some(PlaybackState::Play));
        assert_eq!(
            PlaybackState::from_wire("InputRecord"),
            Some(PlaybackState::Record)
        );
        assert_eq!(
            PlaybackState::from_wire("Recording"),
            Some(PlaybackState::Record)
        );
        assert_eq!(
            PlaybackState::from_wire("stopped"),
            Some(PlaybackState::Stop)
        );
        assert_eq!(
            PlaybackState::from_wire("ShuttleForward"),
            Some(PlaybackState::Shuttle)
        );
        assert_eq!(PlaybackState::from_wire("Jog"), Some(PlaybackState::Shuttle));
        assert_eq!(PlaybackState::from_wire(""), None);
        assert_eq!(PlaybackState::from_wire("   "), None);
        assert_eq!(PlaybackState::from_wire("standby"), None);
    }
}
