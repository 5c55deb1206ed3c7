// ── Wire types for the deck control API ──
//
// The deck's JSON is loosely specified across firmware generations, so
// response types keep unknown fields where callers may still want them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET status` — overall device health.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    /// Power / readiness indicator, e.g. `"ok"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Storage slot state, if reported.
    #[serde(default)]
    pub slot_state: Option<String>,
    /// Remaining fields vary by firmware generation.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Acknowledgement returned by transport commands.
///
/// Decks answer `204 No Content` for most commands; some firmware returns
/// a small JSON body. Both normalize into this struct.
#[derive(Debug, Clone, Default)]
pub struct CommandAck {
    /// Body returned by the deck, if any.
    pub body: Option<Value>,
}

/// Body of `PUT transports/{index}/shuttle`.
#[derive(Debug, Clone, Serialize)]
pub struct ShuttleRequest {
    /// Signed multiple of play speed.
    pub speed: f64,
}

/// Body of `PUT transports/{index}/record`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_name: Option<String>,
}
