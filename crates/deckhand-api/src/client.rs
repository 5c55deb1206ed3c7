// Hand-crafted async HTTP client for the deck control REST API (v1).
//
// Composes the persistent transport, the retry policy, and the response
// cache into read and command operations: idempotent reads are cached,
// mutating commands invalidate.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::cache::ResponseCache;
use crate::endpoint::DeckEndpoint;
use crate::error::Error;
use crate::retry::{ErrorKind, RetryDecision, RetryPolicy};
use crate::transport::TransportConfig;
use crate::types::{CommandAck, DeviceStatus, RecordRequest, ShuttleRequest};

/// Highest transport sub-unit addressable within one physical deck.
pub const MAX_TRANSPORT_INDEX: u8 = 7;

/// Largest shuttle speed the deck accepts, as a multiple of play speed.
pub const MAX_SHUTTLE_SPEED: f64 = 50.0;

// ── Error response shape from the deck ───────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// How to treat a success body that is not JSON.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ResponseMode {
    /// Reads: a non-JSON body is a protocol error.
    Strict,
    /// Command acks: some firmware answers with plain text; keep it.
    Lenient,
}

// ── Options ──────────────────────────────────────────────────────────

/// Tuning knobs for a [`DeckClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub transport: TransportConfig,
    pub retry: RetryPolicy,
    /// Response cache time-to-live.
    pub cache_ttl: Duration,
    /// Response cache entry bound.
    pub cache_capacity: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            retry: RetryPolicy::default(),
            cache_ttl: Duration::from_millis(500),
            cache_capacity: 64,
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for a single deck.
///
/// Owns its own HTTP session, cache, and retry policy — no process-wide
/// shared state, so multiple deck clients can coexist.
pub struct DeckClient {
    http: reqwest::Client,
    endpoint: DeckEndpoint,
    policy: RetryPolicy,
    cache: ResponseCache,
    timeout: Duration,
}

impl DeckClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client with its own persistent HTTP session.
    pub fn new(endpoint: DeckEndpoint, options: &ClientOptions) -> Result<Self, Error> {
        let http = options.transport.build_client()?;
        Ok(Self::from_reqwest(endpoint, http, options))
    }

    /// Wrap an existing `reqwest::Client` (caller manages its headers).
    pub fn from_reqwest(
        endpoint: DeckEndpoint,
        http: reqwest::Client,
        options: &ClientOptions,
    ) -> Self {
        Self {
            http,
            endpoint,
            policy: options.retry,
            cache: ResponseCache::new(options.cache_capacity, options.cache_ttl),
            timeout: options.transport.timeout,
        }
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &DeckEndpoint {
        &self.endpoint
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Url {
        self.endpoint.join(path)
    }

    // ── Read path ────────────────────────────────────────────────────

    /// Idempotent GET through the cache.
    ///
    /// A live cache entry short-circuits: no network call, no retry
    /// logic. A miss fetches with retries and stores the fresh body.
    /// Exhausted retries surface the classified error; a stale entry is
    /// never served as a substitute.
    async fn read(&self, path: &str, query: &[(&str, String)]) -> Result<Value, Error> {
        let key = ResponseCache::key(path, query);
        if let Some(body) = self.cache.get(&key) {
            debug!(key, "cache hit");
            return Ok(body);
        }

        let url = self.url(path);
        debug!(%url, "GET");

        let query = query.to_vec();
        let body = self
            .request_with_retry(
                || self.http.get(url.clone()).query(&query),
                ResponseMode::Strict,
            )
            .await?;

        self.cache.insert(key, body.clone());
        Ok(body)
    }

    // ── Command path ─────────────────────────────────────────────────

    /// Mutating PUT against a transport sub-unit.
    ///
    /// On any outcome — success or terminal failure — every cache entry
    /// the command could have changed is dropped: after a failed command
    /// the deck's state is just as unknown as after a successful one.
    async fn command<B: Serialize + Sync>(
        &self,
        index: u8,
        action: &str,
        body: Option<&B>,
    ) -> Result<CommandAck, Error> {
        let url = self.url(&format!("transports/{index}/{action}"));
        debug!(%url, "PUT");

        let result = self
            .request_with_retry(
                || match body {
                    Some(body) => self.http.put(url.clone()).json(body),
                    None => self.http.put(url.clone()),
                },
                ResponseMode::Lenient,
            )
            .await;

        self.invalidate_after_command(index);

        result.map(|value| CommandAck {
            body: if value.is_null() { None } else { Some(value) },
        })
    }

    fn invalidate_after_command(&self, index: u8) {
        self.cache.invalidate_prefixes(&[
            format!("transports/{index}"),
            "status".to_owned(),
            "clips".to_owned(),
        ]);
    }

    // ── Retry loop ───────────────────────────────────────────────────

    async fn request_with_retry<F>(&self, build: F, mode: ResponseMode) -> Result<Value, Error>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 1u32;
        loop {
            match self.send_once(build(), mode).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    let kind = ErrorKind::classify(&err);
                    match self.policy.decide(attempt, kind) {
                        RetryDecision::NoRetry => return Err(err),
                        RetryDecision::RetryAfter(delay) => {
                            warn!(
                                attempt,
                                error = %err,
                                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                                "request failed; retrying"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                    }
                }
            }
        }
    }

    async fn send_once(
        &self,
        request: reqwest::RequestBuilder,
        mode: ResponseMode,
    ) -> Result<Value, Error> {
        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_millis: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                }
            } else {
                Error::Transport(e)
            }
        })?;
        self.handle_response(resp, mode).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(
        &self,
        resp: reqwest::Response,
        mode: ResponseMode,
    ) -> Result<Value, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(parse_device_error(status, &body));
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => match mode {
                ResponseMode::Lenient => Ok(serde_json::json!({ "ok": true, "raw": body })),
                ResponseMode::Strict => {
                    let preview = &body[..body.len().min(200)];
                    Err(Error::Protocol {
                        message: format!("{e} (body preview: {preview:?})"),
                        body,
                    })
                }
            },
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Status ───────────────────────────────────────────────────────

    /// `GET status` — overall device status (power, slot state). Cached.
    pub async fn get_status(&self) -> Result<DeviceStatus, Error> {
        let body = self.read("status", &[]).await?;
        serde_json::from_value(body.clone()).map_err(|e| Error::Protocol {
            message: format!("unexpected status shape: {e}"),
            body: body.to_string(),
        })
    }

    /// Lightweight reachability probe.
    ///
    /// Goes through the normal read path, so a healthy probe also warms
    /// the status cache.
    pub async fn health_check(&self) -> Result<(), Error> {
        self.read("status", &[]).await.map(|_| ())
    }

    // ── Transport reads ──────────────────────────────────────────────

    /// `GET transports/{index}` — playback state, timecode, active clip.
    /// Cached. The raw payload is returned; field layout varies by
    /// firmware, so interpretation is left to the caller.
    pub async fn get_transport(&self, index: u8) -> Result<Value, Error> {
        validate_index(index)?;
        self.read(&format!("transports/{index}"), &[]).await
    }

    /// Active clip for a transport.
    ///
    /// Tries `GET clips/active` first; older firmware lacks it, so a
    /// device-level rejection falls back to scanning `GET clips` for an
    /// `active` marker. Transient failures propagate instead of falling
    /// back — the list would hit the same unreachable deck.
    pub async fn get_active_clip(&self, index: u8) -> Result<Option<Value>, Error> {
        validate_index(index)?;
        match self.read("clips/active", &[]).await {
            Ok(Value::Null) => Ok(None),
            Ok(clip) => Ok(Some(clip)),
            Err(err) if err.is_transient() => Err(err),
            Err(_) => {
                let clips = self.read("clips", &[]).await?;
                let items = match clips {
                    Value::Object(ref map) => map
                        .get("items")
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default(),
                    Value::Array(items) => items,
                    _ => Vec::new(),
                };
                Ok(items
                    .into_iter()
                    .find(|clip| clip.get("active").and_then(Value::as_bool) == Some(true)))
            }
        }
    }

    // ── Transport commands ───────────────────────────────────────────

    /// `PUT transports/{index}/play`.
    pub async fn play(&self, index: u8) -> Result<CommandAck, Error> {
        validate_index(index)?;
        self.command::<()>(index, "play", None).await
    }

    /// `PUT transports/{index}/stop` — stops playback or recording.
    pub async fn stop(&self, index: u8) -> Result<CommandAck, Error> {
        validate_index(index)?;
        self.command::<()>(index, "stop", None).await
    }

    /// `PUT transports/{index}/record`, optionally naming the clip.
    pub async fn record(&self, index: u8, clip_name: Option<&str>) -> Result<CommandAck, Error> {
        validate_index(index)?;
        if let Some(name) = clip_name {
            if name.trim().is_empty() {
                return Err(Error::Validation {
                    message: "clip name must not be blank".into(),
                });
            }
        }
        let body = clip_name.map(|name| RecordRequest {
            clip_name: Some(name.to_owned()),
        });
        self.command(index, "record", body.as_ref()).await
    }

    /// `PUT transports/{index}/shuttle` at a signed speed multiple.
    pub async fn shuttle(&self, index: u8, speed: f64) -> Result<CommandAck, Error> {
        validate_index(index)?;
        if !speed.is_finite() || speed.abs() > MAX_SHUTTLE_SPEED {
            return Err(Error::Validation {
                message: format!(
                    "shuttle speed {speed} outside supported range ±{MAX_SHUTTLE_SPEED}"
                ),
            });
        }
        self.command(index, "shuttle", Some(&ShuttleRequest { speed }))
            .await
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn validate_index(index: u8) -> Result<(), Error> {
    if index > MAX_TRANSPORT_INDEX {
        return Err(Error::Validation {
            message: format!("transport index {index} outside 0-{MAX_TRANSPORT_INDEX}"),
        });
    }
    Ok(())
}

fn parse_device_error(status: reqwest::StatusCode, raw: &str) -> Error {
    if let Ok(err) = serde_json::from_str::<ErrorResponse>(raw) {
        Error::Device {
            status: status.as_u16(),
            message: err.message.unwrap_or_else(|| status.to_string()),
        }
    } else {
        Error::Device {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw.to_owned()
            },
        }
    }
}
