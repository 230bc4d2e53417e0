//! Listener configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

pub const DEFAULT_PORT: u16 = 10000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ListenConfig {
    /// The bind address. Hostnames are rejected rather than resolved, so a
    /// name never silently widens to every interface.
    pub fn ip(&self) -> Result<IpAddr, ConfigError> {
        self.host
            .parse()
            .map_err(|_| ConfigError::InvalidListenHost(self.host.clone()))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
