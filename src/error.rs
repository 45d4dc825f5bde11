//! Error types using thiserror
//!
//! Error hierarchy:
//! - ConfigError: invalid gateway configuration, raised at construction
//! - RegistryError: adapter registry violations, raised at load time
//! - FetchError: per-call failures (parse, transport, upstream, retries)

use thiserror::Error;

/// Top-level error type
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Gateway configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Adapter registry errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Fetch operation errors
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Errors raised while validating gateway configuration
///
/// These are always surfaced at adapter construction, never at request time.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A host prefix is missing its trailing path separator
    #[error("gateway prefix '{prefix}' must end with '/'")]
    MissingTrailingSlash { prefix: String },

    /// The gateway pool has no entries to choose from
    #[error("gateway pool is empty: at least one host prefix is required")]
    EmptyGatewayPool,

    /// The underlying HTTP client could not be built
    #[error("failed to build HTTP client: {message}")]
    HttpClient { message: String },
}

/// Errors raised by the adapter registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// An adapter with the same name is already registered
    #[error("adapter '{name}' already exists in registry")]
    DuplicateRegistration { name: String },
}

/// Errors raised by fetch operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// Input URI could not be parsed; no network call was attempted
    #[error("malformed URI '{uri}': {message}")]
    MalformedUri { uri: String, message: String },

    /// Connection-level failure (refused, reset, DNS)
    #[error("transport failure for '{url}': {message}")]
    Transport { url: String, message: String },

    /// The per-call timeout elapsed
    #[error("timeout while fetching '{url}'")]
    Timeout { url: String },

    /// Upstream answered with a non-2xx status; passed through, never retried
    #[error("upstream returned HTTP {status} for '{url}'")]
    Upstream { url: String, status: u16 },

    /// Transient failures persisted through every allowed attempt
    #[error("retries exhausted after {attempts} attempt(s) for '{uri}': {source}")]
    RetriesExhausted {
        uri: String,
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },

    /// The URI is well-formed but no registered adapter or default transport
    /// can dispatch its scheme
    #[error("no adapter registered for scheme '{scheme}' in '{uri}'")]
    UnsupportedScheme { uri: String, scheme: String },

    /// No adapter matched and the default transport cannot address the URI
    #[error("probe failed for '{uri}': {message}")]
    ProbeFailed { uri: String, message: String },
}

impl RegistryError {
    /// Creates a new DuplicateRegistration error
    pub fn duplicate_registration(name: impl Into<String>) -> Self {
        RegistryError::DuplicateRegistration { name: name.into() }
    }
}

impl FetchError {
    /// Creates a new MalformedUri error
    pub fn malformed_uri(uri: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::MalformedUri {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Creates a new Transport error
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(url: impl Into<String>) -> Self {
        FetchError::Timeout { url: url.into() }
    }

    /// Creates a new ProbeFailed error
    pub fn probe_failed(uri: impl Into<String>, message: impl Into<String>) -> Self {
        FetchError::ProbeFailed {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Classify a reqwest error for a given request URL
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::timeout(url)
        } else {
            FetchError::transport(url, err.to_string())
        }
    }

    /// Whether the retry policy may try this failure again
    ///
    /// Only connection-level failures and timeouts are transient; parse
    /// errors and upstream HTTP statuses are final.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transport { .. } | FetchError::Timeout { .. })
    }
}
