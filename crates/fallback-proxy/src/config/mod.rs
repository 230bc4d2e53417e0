//! Configuration types for the fallback proxy.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! command-line / environment overrides applied by the binary. The resulting
//! [`ProxyConfig`] is immutable and shared by every handler.

mod listen;
mod protocol;
mod upstream;

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use listen::{ListenConfig, DEFAULT_PORT};
pub use protocol::Protocol;
pub use upstream::{
    ConnectionPoolConfig, UpstreamConfig, UpstreamTarget, DEFAULT_TIMEOUT_MS, DEFAULT_UPSTREAM_URL,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl ProxyConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: ProxyConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen.ip()?;
        self.upstream.validate()
    }

    /// Address the listener binds to.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.listen.ip()?, self.listen.port))
    }
}
