//! Proxy module
//!
//! Provider registry and the engine that forwards requests to upstream providers.

pub mod forward;
pub mod headers;
pub mod logging;
pub mod registry;
pub mod streaming;

pub use forward::{build_client, ForwardError, ForwardingEngine, UpstreamClient};
pub use registry::{ProviderRegistry, ProviderTarget, RegistryError};
