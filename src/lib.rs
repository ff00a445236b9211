//! LLM Proxy - path-based streaming reverse proxy for LLM API providers
//!
//! Requests to `/<prefix>/<provider>/<rest>` are forwarded to the provider's
//! upstream at `<rest>`, with streaming responses relayed as they arrive.

pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

pub use crate::config::Config;
pub use crate::proxy::{build_client, ForwardingEngine, ProviderRegistry, ProviderTarget};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    /// Read-only provider table, built once at startup
    pub registry: Arc<ProviderRegistry>,
    /// Forwarder shared by every provider
    pub engine: ForwardingEngine,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        let registry = ProviderRegistry::build(&config.providers);
        Self::with_registry(config, registry)
    }

    /// Create application state around an already built registry
    pub fn with_registry(config: Config, registry: ProviderRegistry) -> Result<Self> {
        let http_client =
            build_client(Duration::from_secs(config.upstream_connect_timeout_seconds))
                .context("Failed to build upstream HTTP client")?;

        let engine = ForwardingEngine::new(http_client, config.route_prefix.clone());

        Ok(Self {
            config,
            registry: Arc::new(registry),
            engine,
        })
    }
}
