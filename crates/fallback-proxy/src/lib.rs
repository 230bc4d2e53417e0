//! Reverse proxy for a single upstream API with a substitute-data fallback.
//!
//! `/users` traffic is forwarded to the upstream origin; when the upstream
//! cannot be reached the caller gets a fixed set of substitute users instead of
//! an error. `/health`, `/` and `/diagnose` are answered locally.

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod metrics;
pub mod proxy;
pub mod substitute;

pub use config::ProxyConfig;
pub use error::{ConfigError, UpstreamError};
pub use proxy::ProxyServer;
