//! Gateway configuration
//!
//! Holds the pool of gateway host prefixes an adapter may rewrite to,
//! optional credentials, and the per-call timeout. Validation is fail-fast:
//! an invalid config never reaches request time.

use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// Default Arweave gateway
pub const DEFAULT_GATEWAY: &str = "https://arweave.net/";

/// Default per-call timeout for adapter-routed requests (10 seconds)
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a gateway-rewriting adapter
///
/// Every host prefix must end with `/` so that rewritten URLs join cleanly
/// with the original authority and path.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Candidate gateway base URLs, each ending with `/`
    pub host_prefixes: Vec<String>,
    /// Optional credential key for gateways that require one
    #[serde(default)]
    pub key: Option<String>,
    /// Optional credential secret for gateways that require one
    #[serde(default)]
    pub secret: Option<String>,
    /// Per-call timeout forced onto requests routed through the adapter
    #[serde(default = "default_timeout", with = "serde_seconds")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_ADAPTER_TIMEOUT
}

/// Deserialize the timeout from a plain seconds integer
mod serde_seconds {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host_prefixes: vec![DEFAULT_GATEWAY.to_string()],
            key: None,
            secret: None,
            timeout: DEFAULT_ADAPTER_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Create a config with a custom gateway pool and the default timeout
    pub fn with_host_prefixes(host_prefixes: Vec<String>) -> Self {
        Self {
            host_prefixes,
            ..Self::default()
        }
    }

    /// Set the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the credential pair
    pub fn with_credentials(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self.secret = Some(secret.into());
        self
    }

    /// Check the construction invariants without mutating anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host_prefixes.is_empty() {
            return Err(ConfigError::EmptyGatewayPool);
        }
        for prefix in &self.host_prefixes {
            if !prefix.ends_with('/') {
                return Err(ConfigError::MissingTrailingSlash {
                    prefix: prefix.clone(),
                });
            }
        }
        Ok(())
    }
}
