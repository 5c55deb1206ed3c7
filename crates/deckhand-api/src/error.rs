use thiserror::Error;

/// Top-level error type for the `deckhand-api` crate.
///
/// Covers every failure mode of talking to a deck: local validation,
/// transport, device-reported errors, and malformed responses.
/// `deckhand-core` maps these into consumer-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Local ───────────────────────────────────────────────────────
    /// Command parameters rejected before any network traffic.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Deck address could not be parsed into a base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused/reset, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {timeout_millis}ms")]
    Timeout { timeout_millis: u64 },

    // ── Device ──────────────────────────────────────────────────────
    /// The deck answered with an error status.
    #[error("Device error (HTTP {status}): {message}")]
    Device { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Response body did not match the expected shape, with the raw body
    /// kept for debugging.
    #[error("Protocol error: {message}")]
    Protocol { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient failure worth retrying.
    ///
    /// Connection-level failures, timeouts, and 5xx responses qualify;
    /// validation errors, 4xx rejections, and malformed bodies do not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Device { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Device { status: 404, .. })
    }

    /// HTTP status reported by the deck, if any.
    pub fn device_status(&self) -> Option<u16> {
        match self {
            Self::Device { status, .. } => Some(*status),
            _ => None,
        }
    }
}
