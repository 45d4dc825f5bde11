//! Content fetcher built on adapter dispatch
//!
//! The fetcher owns retry/timeout policy and two independent routing tables:
//! one for the blocking dispatch path, one for the async path. An adapter
//! registered for one path is not visible to the other; callers register on
//! both when both are needed. Registration is an initialization-time
//! activity; fetch calls only read the tables.

use crate::adapter::Adapter;
use crate::error::{ConfigError, FetchError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Default timeout for fetcher-level requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries after the initial attempt
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("gatefetch/", env!("CARGO_PKG_VERSION"));

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// Mime type reported when upstream declares none
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Consumer-facing fetch capability set
///
/// Owns timeout and retry configuration (setters take effect for subsequent
/// calls, never retroactively), accepts adapter registrations keyed by URL
/// prefix, and exposes probe and content-fetch operations routed through
/// whichever registered adapter matches. Worst-case latency for a fetch is
/// `timeout * (max_retries + 1)` plus backoff delays; timeouts are per-call,
/// not cumulative.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Set the timeout for subsequent fetcher-level requests
    fn set_timeout(&mut self, timeout: Duration);

    /// Set the retry budget for subsequent fetches
    fn set_max_retries(&mut self, max_retries: u32);

    /// Register an adapter for the blocking dispatch path
    fn register_adapter(&mut self, adapter: Arc<dyn Adapter>, url_prefix: &str);

    /// Register adapters for the async dispatch path
    ///
    /// Supplied as a mapping so several prefixes can share one adapter. The
    /// async table is independent of the blocking one.
    fn register_async_adapters(&mut self, adapters: HashMap<String, Arc<dyn Adapter>>);

    /// Probe the content at a URI, returning its mime type and size in bytes
    fn fetch_mime_type_and_size(&self, uri: &str) -> Result<(String, u64), FetchError>;

    /// Fetch the content at a URI, blocking until response or exhaustion
    fn fetch_content(&self, uri: &str) -> Result<Vec<u8>, FetchError>;

    /// Fetch the content at a URI without blocking the calling thread
    ///
    /// Suspends only at the network I/O boundary. Dropping the future
    /// cancels the in-flight request.
    async fn fetch_content_async(&self, uri: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher over reqwest transports, one blocking and one async
pub struct HttpFetcher {
    timeout: Duration,
    max_retries: u32,
    adapters: Vec<(String, Arc<dyn Adapter>)>,
    async_adapters: Vec<(String, Arc<dyn Adapter>)>,
    client: reqwest::blocking::Client,
    async_client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with default timeout and retry settings
    ///
    /// Timeouts are applied per request rather than baked into the clients,
    /// so `set_timeout` takes effect immediately for subsequent calls.
    pub fn new() -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;
        let async_client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            adapters: Vec::new(),
            async_adapters: Vec::new(),
            client,
            async_client,
        })
    }

    /// Set the retry budget, builder style
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the timeout, builder style
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Longest registered prefix wins
    fn match_adapter<'a>(
        table: &'a [(String, Arc<dyn Adapter>)],
        uri: &str,
    ) -> Option<&'a Arc<dyn Adapter>> {
        table
            .iter()
            .filter(|(prefix, _)| uri.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, adapter)| adapter)
    }

    /// Validate that the default transport can address a URI
    fn default_target(&self, uri: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(uri).map_err(|e| FetchError::malformed_uri(uri, e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => Ok(uri.to_string()),
            scheme => Err(FetchError::UnsupportedScheme {
                uri: uri.to_string(),
                scheme: scheme.to_string(),
            }),
        }
    }

    /// One blocking fetch attempt, no retry policy applied
    fn try_fetch_once(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let response = match Self::match_adapter(&self.adapters, uri) {
            Some(adapter) => adapter.send(&self.client, uri)?,
            None => {
                let url = self.default_target(uri)?;
                self.client
                    .get(&url)
                    .timeout(self.timeout)
                    .send()
                    .map_err(|e| FetchError::from_reqwest(&url, e))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }
        response
            .bytes()
            .map(|body| body.to_vec())
            .map_err(|e| FetchError::from_reqwest(uri, e))
    }

    /// One async fetch attempt, no retry policy applied
    async fn try_fetch_once_async(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let response = match Self::match_adapter(&self.async_adapters, uri) {
            Some(adapter) => adapter.send_async(&self.async_client, uri).await?,
            None => {
                let url = self.default_target(uri)?;
                self.async_client
                    .get(&url)
                    .timeout(self.timeout)
                    .send()
                    .await
                    .map_err(|e| FetchError::from_reqwest(&url, e))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }
        response
            .bytes()
            .await
            .map(|body| body.to_vec())
            .map_err(|e| FetchError::from_reqwest(uri, e))
    }

    /// Blocking GET used by the probe fallback
    fn probe_get(&self, uri: &str) -> Result<reqwest::blocking::Response, FetchError> {
        match Self::match_adapter(&self.adapters, uri) {
            Some(adapter) => adapter.send(&self.client, uri),
            None => {
                let url = self.default_target(uri)?;
                self.client
                    .get(&url)
                    .timeout(self.timeout)
                    .send()
                    .map_err(|e| FetchError::from_reqwest(&url, e))
            }
        }
    }
}

/// Declared content type, or the octet-stream fallback
fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_MIME_TYPE)
        .to_string()
}

/// Declared content length, when upstream sends one
fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn set_max_retries(&mut self, max_retries: u32) {
        self.max_retries = max_retries;
    }

    fn register_adapter(&mut self, adapter: Arc<dyn Adapter>, url_prefix: &str) {
        self.adapters.push((url_prefix.to_string(), adapter));
    }

    fn register_async_adapters(&mut self, adapters: HashMap<String, Arc<dyn Adapter>>) {
        for (prefix, adapter) in adapters {
            self.async_adapters.push((prefix, adapter));
        }
    }

    fn fetch_mime_type_and_size(&self, uri: &str) -> Result<(String, u64), FetchError> {
        let head = match Self::match_adapter(&self.adapters, uri) {
            Some(adapter) => adapter.probe(&self.client, uri),
            None => match self.default_target(uri) {
                Ok(url) => self
                    .client
                    .head(&url)
                    .timeout(self.timeout)
                    .send()
                    .map_err(|e| FetchError::from_reqwest(&url, e)),
                Err(FetchError::UnsupportedScheme { uri, scheme }) => {
                    return Err(FetchError::probe_failed(
                        uri,
                        format!("no adapter registered for scheme '{scheme}'"),
                    ));
                }
                Err(e) => return Err(e),
            },
        };

        // A successful HEAD with a declared length answers the probe; anything
        // else falls back to a GET and reports the observed type and size.
        if let Ok(response) = head {
            if response.status().is_success() {
                let mime = content_type(response.headers());
                if let Some(size) = content_length(response.headers()) {
                    return Ok((mime, size));
                }
            }
        }

        let response = self.probe_get(uri)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }
        let mime = content_type(response.headers());
        let body = response
            .bytes()
            .map_err(|e| FetchError::from_reqwest(uri, e))?;
        Ok((mime, body.len() as u64))
    }

    fn fetch_content(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            match self.try_fetch_once(uri) {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() => {
                    warn!(uri, attempt, error = %e, "transient fetch failure");
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        std::thread::sleep(Duration::from_millis(delay));
                        delay *= 2;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(FetchError::RetriesExhausted {
            uri: uri.to_string(),
            attempts: self.max_retries + 1,
            source: Box::new(
                last_error.unwrap_or_else(|| FetchError::transport(uri, "unknown error")),
            ),
        })
    }

    async fn fetch_content_async(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            match self.try_fetch_once_async(uri).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() => {
                    warn!(uri, attempt, error = %e, "transient fetch failure");
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(FetchError::RetriesExhausted {
            uri: uri.to_string(),
            attempts: self.max_retries + 1,
            source: Box::new(
                last_error.unwrap_or_else(|| FetchError::transport(uri, "unknown error")),
            ),
        })
    }
}
