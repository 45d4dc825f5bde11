//! Arweave gateway adapter
//!
//! Rewrites `ar://<host>[/<path>]` URIs to a concrete HTTP(S) gateway URL by
//! substituting one of the configured host prefixes for the scheme. The
//! prefix is chosen uniformly at random per call: a stateless load-balancing
//! choice with no session affinity and no failover on selection. Both the
//! synchronous and asynchronous dispatch paths go through the same rewrite.

use crate::adapter::Adapter;
use crate::config::GatewayConfig;
use crate::error::{ConfigError, FetchError};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Scheme handled by this adapter
const AR_SCHEME: &str = "ar";

/// Gateway-rewriting adapter for Arweave URIs
#[derive(Debug)]
pub struct ArweaveAdapter {
    config: GatewayConfig,
}

impl ArweaveAdapter {
    /// Create an adapter from a gateway config
    ///
    /// Fails immediately when the config violates its invariants (empty
    /// pool, prefix without a trailing `/`); a constructed adapter can
    /// never produce an invalid rewrite target.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configured gateway pool
    pub fn host_prefixes(&self) -> &[String] {
        &self.config.host_prefixes
    }

    /// Pick one gateway prefix uniformly at random
    fn choose_gateway(&self) -> &str {
        // Pool is non-empty by construction.
        self.config
            .host_prefixes
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(crate::config::DEFAULT_GATEWAY)
    }
}

impl Default for ArweaveAdapter {
    fn default() -> Self {
        // The default config satisfies the invariants, so skip validation.
        Self {
            config: GatewayConfig::default(),
        }
    }
}

#[async_trait]
impl Adapter for ArweaveAdapter {
    fn name(&self) -> &'static str {
        "arweave"
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    fn rewrite_url(&self, url: &str) -> Result<String, FetchError> {
        let parsed =
            Url::parse(url).map_err(|e| FetchError::malformed_uri(url, e.to_string()))?;
        if parsed.scheme() != AR_SCHEME {
            return Ok(url.to_string());
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| FetchError::malformed_uri(url, "missing host"))?;
        let gateway = self.choose_gateway();
        let mut rewritten = format!("{gateway}{host}");
        let path = parsed.path();
        if !path.is_empty() && path != "/" {
            rewritten.push_str(path);
        }
        debug!(from = url, to = %rewritten, "rewrote ar:// url");
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_adapter_name() {
        let adapter = ArweaveAdapter::default();
        assert_eq!(adapter.name(), "arweave");
    }

    #[test]
    fn test_default_timeout() {
        let adapter = ArweaveAdapter::default();
        assert_eq!(adapter.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_rewrite_with_default_gateway() {
        let adapter = ArweaveAdapter::default();
        let rewritten = adapter.rewrite_url("ar://abc123/path/to/file").unwrap();
        assert_eq!(rewritten, "https://arweave.net/abc123/path/to/file");
    }

    #[test]
    fn test_rewrite_without_path() {
        let adapter = ArweaveAdapter::default();
        let rewritten = adapter.rewrite_url("ar://abc123").unwrap();
        assert_eq!(rewritten, "https://arweave.net/abc123");
    }

    #[test]
    fn test_https_url_passes_through_unchanged() {
        let adapter = ArweaveAdapter::default();
        let rewritten = adapter.rewrite_url("https://example.com/foo").unwrap();
        assert_eq!(rewritten, "https://example.com/foo");
    }

    #[test]
    fn test_http_url_passes_through_unchanged() {
        let adapter = ArweaveAdapter::default();
        let rewritten = adapter.rewrite_url("http://example.com").unwrap();
        assert_eq!(rewritten, "http://example.com");
    }

    #[test]
    fn test_ipfs_scheme_passes_through_unchanged() {
        let adapter = ArweaveAdapter::default();
        let rewritten = adapter.rewrite_url("ipfs://QmHash/file.json").unwrap();
        assert_eq!(rewritten, "ipfs://QmHash/file.json");
    }

    #[test]
    fn test_rewritten_url_starts_with_pool_prefix() {
        let pool = vec![
            "https://arweave.net/".to_string(),
            "https://ar-io.net/".to_string(),
            "https://gateway.example.com/".to_string(),
        ];
        let adapter =
            ArweaveAdapter::new(GatewayConfig::with_host_prefixes(pool.clone())).unwrap();
        for _ in 0..50 {
            let rewritten = adapter.rewrite_url("ar://abc123/file").unwrap();
            assert!(pool.iter().any(|p| rewritten.starts_with(p.as_str())));
            assert!(rewritten.ends_with("abc123/file"));
        }
    }

    #[test]
    fn test_random_selection_covers_whole_pool() {
        let pool = vec![
            "https://arweave.net/".to_string(),
            "https://ar-io.net/".to_string(),
            "https://gateway.example.com/".to_string(),
        ];
        let adapter =
            ArweaveAdapter::new(GatewayConfig::with_host_prefixes(pool.clone())).unwrap();

        let mut seen = HashSet::new();
        for _ in 0..300 {
            let rewritten = adapter.rewrite_url("ar://abc123").unwrap();
            for prefix in &pool {
                if rewritten.starts_with(prefix.as_str()) {
                    seen.insert(prefix.clone());
                }
            }
        }
        // 300 draws over a pool of 3 miss an element with probability ~2^-175.
        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn test_construction_fails_without_trailing_slash() {
        let config =
            GatewayConfig::with_host_prefixes(vec!["https://arweave.net".to_string()]);
        let err = ArweaveAdapter::new(config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingTrailingSlash { .. }));
    }

    #[test]
    fn test_construction_fails_on_empty_pool() {
        let config = GatewayConfig::with_host_prefixes(vec![]);
        let err = ArweaveAdapter::new(config).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyGatewayPool));
    }

    #[test]
    fn test_malformed_uri_rejected_before_dispatch() {
        let adapter = ArweaveAdapter::default();
        let err = adapter.rewrite_url("not a uri at all").unwrap_err();
        assert!(matches!(err, FetchError::MalformedUri { .. }));
    }

    #[test]
    fn test_ar_uri_without_host_rejected() {
        let adapter = ArweaveAdapter::default();
        let err = adapter.rewrite_url("ar://").unwrap_err();
        assert!(matches!(err, FetchError::MalformedUri { .. }));
    }
}
