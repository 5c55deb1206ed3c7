// ── Core error types ──
//
// Consumer-facing errors from deckhand-core. These are NOT API-specific --
// consumers never see reqwest errors or raw JSON parse failures directly.
// The `From<deckhand_api::Error>` impl translates transport-layer errors
// into session-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach deck at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Deck request timed out after {timeout_millis}ms")]
    Timeout { timeout_millis: u64 },

    #[error("Deck session is shut down")]
    Shutdown,

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Deck rejected the command: {message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Unexpected response from deck: {message}")]
    Protocol { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<deckhand_api::Error> for CoreError {
    fn from(err: deckhand_api::Error) -> Self {
        match err {
            deckhand_api::Error::Validation { message } => CoreError::ValidationFailed { message },
            deckhand_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid deck address: {e}"),
            },
            deckhand_api::Error::Timeout { timeout_millis } => CoreError::Timeout { timeout_millis },
            deckhand_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_millis: 0 }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                }
            }
            deckhand_api::Error::Device { status, message } => CoreError::Rejected {
                message: format!("HTTP {status}: {message}"),
            },
            deckhand_api::Error::Protocol { message, body: _ } => CoreError::Protocol { message },
        }
    }
}
