//! gatefetch - Gateway-rewriting HTTP fetch layer
//!
//! This library resolves URIs with non-standard schemes (currently the
//! Arweave `ar://` scheme) to concrete HTTP(S) gateway endpoints and fetches
//! their content:
//! - Adapters rewrite scheme-specific URLs to a gateway chosen uniformly at
//!   random from a configured pool
//! - A registry holds adapters under unique names, populated at startup
//! - A fetcher routes probe/content requests through matching adapters and
//!   applies bounded retry with per-call timeouts

pub mod adapter;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod registry;

pub use adapter::{Adapter, ArweaveAdapter};
pub use config::{GatewayConfig, DEFAULT_GATEWAY};
pub use error::{ConfigError, FetchError, GatewayError, RegistryError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use registry::{AdapterRegistry, Registry};
