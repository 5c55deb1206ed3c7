// ── Deck endpoint ──
//
// Network location of a deck, normalized to the control API base path.
// Immutable per session: a different endpoint means a new client instance.

use url::Url;

use crate::error::Error;

/// Path prefix of the deck control API.
const CONTROL_PATH: &str = "/control/api/v1";

/// Normalized base URL of a deck's control API.
///
/// Accepts a bare IP or hostname, `host:port`, or a full URL with or
/// without the `/control/api/v1` suffix; the result always ends in
/// `/control/api/v1/` so relative joins work uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEndpoint {
    base_url: Url,
}

impl DeckEndpoint {
    /// Parse a user-supplied deck address.
    ///
    /// A missing scheme defaults to `http://` (decks ship with plain HTTP
    /// control enabled).
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation {
                message: "empty deck address".into(),
            });
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_owned()
        } else {
            format!("http://{trimmed}")
        };

        let mut url = Url::parse(&with_scheme)?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::Validation {
                    message: format!("unsupported scheme {other:?} for deck address"),
                });
            }
        }
        if url.host_str().is_none() {
            return Err(Error::Validation {
                message: format!("deck address {trimmed:?} has no host"),
            });
        }

        // Strip trailing slashes for uniform handling, then ensure the
        // control path suffix exactly once.
        let path = url.path().trim_end_matches('/').to_owned();
        if path.to_ascii_lowercase().ends_with(CONTROL_PATH) {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}{CONTROL_PATH}/"));
        }

        Ok(Self { base_url: url })
    }

    /// The normalized base URL (always ends with `/control/api/v1/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join a relative path (e.g. `"transports/0"`) onto the base URL.
    pub fn join(&self, path: &str) -> Url {
        // base_url always ends with a slash, so joining relative paths works.
        self.base_url
            .join(path.trim_start_matches('/'))
            .expect("path should be a valid relative URL")
    }
}

impl std::fmt::Display for DeckEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.base_url.fmt(f)
    }
}
