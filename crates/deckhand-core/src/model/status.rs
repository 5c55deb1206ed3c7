// ── Transport status snapshot ──
//
// The deck's transport payload is loosely specified and drifts between
// firmware generations, so derivation probes a set of candidate fields
// rather than deserializing a fixed struct. Unrecognized payloads still
// produce a snapshot (state Unknown, zero timecode) with the raw body
// attached for diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PlaybackState;

/// Field names that may carry the transport state, by firmware generation.
const STATE_FIELDS: &[&str] = &[
    "status",
    "state",
    "transport",
    "transportState",
    "transportMode",
    "mode",
    "playbackStatus",
];

const TIMECODE_FIELDS: &[&str] = &["position", "timecode", "time", "tc", "currentTimecode"];

const CLIP_FIELDS: &[&str] = &["name", "clipName", "title", "filename"];

const ZERO_TIMECODE: &str = "00:00:00:00";

/// Point-in-time snapshot of a transport sub-unit.
///
/// Produced fresh per successful poll and never mutated; each new poll
/// supersedes the previous snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportStatus {
    /// Transport sub-unit this snapshot describes.
    pub index: u8,
    pub playback: PlaybackState,
    /// `HH:MM:SS:FF` position reported by the deck.
    pub timecode: String,
    /// Active clip name, when one is loaded.
    pub clip: Option<String>,
    /// Raw payload, kept for diagnostics.
    pub raw: Value,
    /// When this snapshot was captured.
    pub captured_at: DateTime<Utc>,
}

impl TransportStatus {
    /// Build a snapshot from the wire payload of `transports/{index}`,
    /// with the active clip (if any) resolved separately.
    pub fn from_payload(index: u8, payload: Value, clip: Option<&Value>) -> Self {
        let playback = derive_playback(&payload);
        let timecode = derive_timecode(&payload);
        let clip = clip.and_then(derive_clip_name);
        Self {
            index,
            playback,
            timecode,
            clip,
            raw: payload,
            captured_at: Utc::now(),
        }
    }

    /// Whether the transport is currently recording.
    pub fn is_recording(&self) -> bool {
        self.playback == PlaybackState::Record
    }
}

// ── Derivation helpers ───────────────────────────────────────────────

fn derive_playback(payload: &Value) -> PlaybackState {
    for field in STATE_FIELDS {
        if let Some(raw) = payload.get(*field).and_then(Value::as_str) {
            if let Some(state) = PlaybackState::from_wire(raw) {
                return state;
            }
        }
    }

    // Older payloads carry boolean flags instead of a state string.
    if truthy(payload.get("isRecording")) || truthy(payload.get("recording")) {
        return PlaybackState::Record;
    }
    if truthy(payload.get("isPlaying")) || truthy(payload.get("playing")) {
        return PlaybackState::Play;
    }
    if truthy(payload.get("isStopped")) || truthy(payload.get("stopped")) {
        return PlaybackState::Stop;
    }

    PlaybackState::Unknown
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => {
            matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
        }
        _ => false,
    }
}

fn derive_timecode(payload: &Value) -> String {
    for field in TIMECODE_FIELDS {
        match payload.get(*field) {
            Some(Value::String(s)) if !s.trim().is_empty() => return s.clone(),
            Some(Value::Number(n)) => {
                if let Some(seconds) = n.as_f64() {
                    return seconds_to_timecode(seconds);
                }
            }
            _ => {}
        }
    }
    ZERO_TIMECODE.to_owned()
}

/// Render a numeric position (seconds) as zero-frame timecode.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn seconds_to_timecode(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}:00")
}

fn derive_clip_name(clip: &Value) -> Option<String> {
    if clip.is_null() {
        return None;
    }
    for field in CLIP_FIELDS {
        if let Some(name) = clip.get(*field).and_then(Value::as_str) {
            if !name.trim().is_empty() {
                return Some(name.to_owned());
            }
        }
    }
    // A clip is loaded but nothing names it.
    Some("unnamed".to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn state_string_fields_probed_in_order() {
        let status = TransportStatus::from_payload(
            0,
            json!({"transportState": "InputRecord", "timecode": "01:02:03:04"}),
            None,
        );
        assert_eq!(status.playback, PlaybackState::Record);
        assert_eq!(status.timecode, "01:02:03:04");
        assert!(status.is_recording());
    }

    #[test]
    fn boolean_flags_back_fill_missing_state() {
        let status = TransportStatus::from_payload(0, json!({"isPlaying": true}), None);
        assert_eq!(status.playback, PlaybackState::Play);

        let status = TransportStatus::from_payload(0, json!({"recording": "yes"}), None);
        assert_eq!(status.playback, PlaybackState::Record);

        let status = TransportStatus::from_payload(0, json!({"stopped": 1}), None);
        assert_eq!(status.playback, PlaybackState::Stop);
    }

    #[test]
    fn unrecognized_payload_still_yields_snapshot() {
        let status = TransportStatus::from_payload(2, json!({"firmware": "8.x"}), None);
        assert_eq!(status.playback, PlaybackState::Unknown);
        assert_eq!(status.timecode, ZERO_TIMECODE);
        assert_eq!(status.clip, None);
        assert_eq!(status.raw["firmware"], "8.x");
        assert_eq!(status.index, 2);
    }

    #[test]
    fn numeric_position_rendered_as_timecode() {
        let status = TransportStatus::from_payload(0, json!({"position": 3723}), None);
        assert_eq!(status.timecode, "01:02:03:00");

        let status = TransportStatus::from_payload(0, json!({"position": 59.9}), None);
        assert_eq!(status.timecode, "00:00:59:00");
    }

    #[test]
    fn clip_name_probed_across_fields() {
        let clip = json!({"clipName": "evening_news"});
        let status = TransportStatus::from_payload(0, json!({"state": "play"}), Some(&clip));
        assert_eq!(status.clip.as_deref(), Some("evening_news"));

        let clip = json!({"filename": "a001.mov"});
        let status = TransportStatus::from_payload(0, json!({"state": "play"}), Some(&clip));
        assert_eq!(status.clip.as_deref(), Some("a001.mov"));
    }

    #[test]
    fn loaded_but_nameless_clip_is_unnamed() {
        let clip = json!({"durationFrames": 1200});
        let status = TransportStatus::from_payload(0, json!({"state": "play"}), Some(&clip));
        assert_eq!(status.clip.as_deref(), Some("unnamed"));
    }

    #[test]
    fn absent_clip_stays_none() {
        let status = TransportStatus::from_payload(0, json!({"state": "play"}), None);
        assert_eq!(status.clip, None);

        let status =
            TransportStatus::from_payload(0, json!({"state": "play"}), Some(&Value::Null));
        assert_eq!(status.clip, None);
    }
}
