//! Configuration management for the LLM proxy
//!
//! Configuration is loaded from environment variables.

use std::collections::BTreeMap;
use std::env;

use anyhow::{Context, Result};

/// Default upstream base URLs, keyed by provider name, with the
/// environment variable that overrides each one.
const PROVIDER_DEFAULTS: &[(&str, &str, &str)] = &[
    ("openai", "OPENAI_BASE_URL", "https://api.openai.com"),
    ("anthropic", "ANTHROPIC_BASE_URL", "https://api.anthropic.com"),
    (
        "google",
        "GOOGLE_BASE_URL",
        "https://generativelanguage.googleapis.com",
    ),
    ("grok", "GROK_BASE_URL", "https://api.x.ai"),
];

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// First path segment of every proxied route (`/<prefix>/<provider>/...`)
    pub route_prefix: String,

    /// Provider name -> upstream base URL
    pub providers: BTreeMap<String, String>,

    /// Connect timeout for upstream connections (in seconds)
    pub upstream_connect_timeout_seconds: u64,
    /// Time in-flight requests get to finish after a shutdown signal (in seconds)
    pub shutdown_grace_seconds: u64,

    /// Emit JSON log lines instead of human-readable output
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let providers = PROVIDER_DEFAULTS
            .iter()
            .map(|(name, key, default)| {
                let base_url = var(key).unwrap_or_else(|| default.to_string());
                (name.to_string(), base_url)
            })
            .collect();

        Ok(Self {
            host: var("LLM_PROXY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "9000".to_string())
                .parse()
                .context("Invalid PORT")?,

            route_prefix: var("LLM_PROXY_ROUTE_PREFIX")
                .map(|prefix| prefix.trim_matches('/').to_string())
                .filter(|prefix| !prefix.is_empty())
                .unwrap_or_else(|| "llm".to_string()),

            providers,

            upstream_connect_timeout_seconds: var("UPSTREAM_CONNECT_TIMEOUT_SECONDS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .context("Invalid UPSTREAM_CONNECT_TIMEOUT_SECONDS")?,
            shutdown_grace_seconds: var("SHUTDOWN_GRACE_SECONDS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .context("Invalid SHUTDOWN_GRACE_SECONDS")?,

            log_json: var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }
}
