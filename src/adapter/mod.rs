//! Transport adapters for non-standard URI schemes
//!
//! This module provides:
//! - The `Adapter` trait: rewrite a scheme-specific URL to a concrete HTTP
//!   endpoint, then dispatch on an injected client (blocking or async)
//! - The Arweave gateway adapter (`ar://` scheme)

mod arweave;

pub use arweave::ArweaveAdapter;

use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Trait for scheme-rewriting transport adapters
///
/// An adapter intercepts an outgoing URL, rewrites it to a concrete HTTP(S)
/// endpoint when its special scheme matches, forces its configured timeout
/// onto the call, and delegates to the injected client. Responses come back
/// verbatim: adapters never interpret status codes and never retry (retry
/// policy belongs to the fetcher).
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Registry key for this adapter, derived from the adapter type
    fn name(&self) -> &'static str;

    /// Per-call timeout forced onto requests routed through this adapter
    fn timeout(&self) -> Duration;

    /// Rewrite a scheme-specific URL to a concrete HTTP(S) URL
    ///
    /// URLs with any other scheme pass through unchanged. Unparseable input
    /// fails with `MalformedUri` before any network call.
    fn rewrite_url(&self, url: &str) -> Result<String, FetchError>;

    /// Synchronous dispatch: rewrite, then GET on the blocking client
    fn send(
        &self,
        client: &reqwest::blocking::Client,
        url: &str,
    ) -> Result<reqwest::blocking::Response, FetchError> {
        let target = self.rewrite_url(url)?;
        client
            .get(&target)
            .timeout(self.timeout())
            .send()
            .map_err(|e| FetchError::from_reqwest(&target, e))
    }

    /// Synchronous content probe: rewrite, then HEAD on the blocking client
    fn probe(
        &self,
        client: &reqwest::blocking::Client,
        url: &str,
    ) -> Result<reqwest::blocking::Response, FetchError> {
        let target = self.rewrite_url(url)?;
        client
            .head(&target)
            .timeout(self.timeout())
            .send()
            .map_err(|e| FetchError::from_reqwest(&target, e))
    }

    /// Asynchronous dispatch: rewrite, then GET on the async client
    ///
    /// Suspends only at the network call; redirects are followed by the
    /// client. Dropping the returned future cancels the in-flight request
    /// and releases the connection.
    async fn send_async(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<reqwest::Response, FetchError> {
        let target = self.rewrite_url(url)?;
        client
            .get(&target)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&target, e))
    }
}
