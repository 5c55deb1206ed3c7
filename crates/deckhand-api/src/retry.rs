// ── Retry and backoff policy ──
//
// Error classification and exponential backoff decisions live here so the
// client's read and command paths share one policy. The policy is a pure
// decision function; the client owns the sleeping.

use std::hash::{BuildHasher, Hasher, RandomState};
use std::time::Duration;

use crate::error::Error;

/// High-level classification of an error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection refused/reset, DNS, etc.).
    Connection,
    /// Retryable HTTP status from the deck (5xx).
    Http5xx(u16),
    /// Any other error (not retried: 4xx, validation, malformed bodies).
    Other,
}

impl ErrorKind {
    /// Classify a client error for retry decisions.
    pub fn classify(err: &Error) -> Self {
        match err {
            Error::Timeout { .. } => Self::Timeout,
            Error::Transport(e) if e.is_timeout() => Self::Timeout,
            Error::Transport(e) if e.is_connect() => Self::Connection,
            Error::Device { status, .. } if (500..=599).contains(status) => Self::Http5xx(*status),
            _ => Self::Other,
        }
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy with a cap and random jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on the backoff delay, before jitter.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Compute the next backoff delay for a given attempt and error kind.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns
    /// [`RetryDecision::NoRetry`] once `attempt` reaches `max_attempts`
    /// or for error kinds that never resolve on retry.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::Timeout | ErrorKind::Connection | ErrorKind::Http5xx(_) => {
                // base * 2^(attempt-1), capped, plus jitter in [0, delay/2]
                // so simultaneous clients do not fall into lockstep.
                let exp = 1u32 << attempt.saturating_sub(1).min(8);
                let raw = self.base_delay.saturating_mul(exp);
                let delay = raw.min(self.max_delay);
                RetryDecision::RetryAfter(delay.saturating_add(jitter(delay)))
            }
        }
    }
}

/// Random duration in `[0, delay/2]`.
fn jitter(delay: Duration) -> Duration {
    let half_millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX) / 2;
    if half_millis == 0 {
        return Duration::ZERO;
    }

    // RandomState seeds its hash keys randomly per instance, which is all
    // the entropy jitter needs.
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u64(half_millis);
    Duration::from_millis(hasher.finish() % (half_millis + 1))
}
