//! Provider registry
//!
//! Maps provider names to the upstream they are forwarded to. Built once at
//! startup and never mutated afterwards, so it is shared between requests
//! without locking.

use std::collections::{BTreeMap, HashMap};

use axum::http::Uri;
use thiserror::Error;
use tracing::{info, warn};

/// Provider whose streaming endpoints need an explicit `Accept: text/event-stream`
const EVENT_STREAM_ACCEPT_PROVIDER: &str = "anthropic";

/// Registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unsupported provider: {0}")]
    UnknownProvider(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

fn invalid_base_url(url: &str, reason: impl Into<String>) -> RegistryError {
    RegistryError::InvalidBaseUrl {
        url: url.to_string(),
        reason: reason.into(),
    }
}

/// Where requests for one provider are forwarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTarget {
    /// Provider name as it appears in the request path
    pub name: String,
    /// Upstream scheme (`http` or `https`)
    pub scheme: String,
    /// Upstream authority: host plus explicit port, if any
    pub host: String,
}

impl ProviderTarget {
    /// Parse a target from a configured base URL.
    ///
    /// Only the scheme and authority are kept.
    pub fn from_base_url(name: &str, base_url: &str) -> Result<Self, RegistryError> {
        let url: Uri = base_url
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| invalid_base_url(base_url, e.to_string()))?;

        let scheme = url
            .scheme_str()
            .ok_or_else(|| invalid_base_url(base_url, "missing scheme"))?;
        if scheme != "http" && scheme != "https" {
            return Err(invalid_base_url(
                base_url,
                format!("unsupported scheme '{}'", scheme),
            ));
        }

        let host = url
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid_base_url(base_url, "missing host"))?;

        let host = match url.port_u16() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        if !matches!(url.path(), "" | "/") || url.query().is_some() {
            warn!(
                provider = %name,
                base_url = %base_url,
                "Ignoring path and query of provider base URL"
            );
        }

        Ok(Self {
            name: name.to_string(),
            scheme: scheme.to_string(),
            host,
        })
    }

    /// Whether stream-flagged JSON requests must carry `Accept: text/event-stream`
    pub fn requires_event_stream_accept(&self) -> bool {
        self.name == EVENT_STREAM_ACCEPT_PROVIDER
    }

    /// `scheme://host` prefix for upstream URLs
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

/// Read-only provider name -> target mapping
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    targets: HashMap<String, ProviderTarget>,
}

impl ProviderRegistry {
    /// Build the registry from provider name -> base URL pairs.
    ///
    /// Providers whose URL can't be used are skipped with a warning.
    pub fn build(providers: &BTreeMap<String, String>) -> Self {
        let mut targets = HashMap::with_capacity(providers.len());

        for (name, base_url) in providers {
            match ProviderTarget::from_base_url(name, base_url) {
                Ok(target) => {
                    info!(
                        provider = %name,
                        upstream = %target.origin(),
                        "Registered provider"
                    );
                    targets.insert(name.clone(), target);
                }
                Err(error) => {
                    warn!(
                        provider = %name,
                        base_url = %base_url,
                        error = %error,
                        "Skipping provider with invalid base URL"
                    );
                }
            }
        }

        Self { targets }
    }

    /// Look up a provider by exact, case-sensitive name
    pub fn resolve(&self, name: &str) -> Result<&ProviderTarget, RegistryError> {
        self.targets
            .get(name)
            .ok_or_else(|| RegistryError::UnknownProvider(name.to_string()))
    }

    /// Registered provider names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
