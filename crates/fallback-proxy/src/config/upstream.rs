//! Upstream origin and connection pool configuration.

use super::protocol::Protocol;
use crate::error::ConfigError;
use hyper::Uri;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_UPSTREAM_URL: &str = "https://fakestoreapi.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Origin that `/users` traffic is forwarded to, e.g. `https://fakestoreapi.com`
    #[serde(default = "default_upstream_url")]
    pub url: String,
    /// Deadline for a whole upstream exchange (proxy) or probe (diagnostics)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub connection_pool: ConnectionPoolConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            timeout_ms: default_timeout_ms(),
            connection_pool: ConnectionPoolConfig::default(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parse the configured URL into its protocol, host and port.
    pub fn target(&self) -> Result<UpstreamTarget, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidUpstream {
            url: self.url.clone(),
            reason: reason.to_string(),
        };

        let uri: Uri = self.url.parse().map_err(|_| invalid("not a valid URI"))?;
        let scheme = uri.scheme_str().ok_or_else(|| invalid("missing scheme"))?;
        let protocol = Protocol::from_scheme(scheme)?;
        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?;

        // Paths on the origin are ignored; requests keep their own path.
        if uri.path() != "/" && !uri.path().is_empty() {
            return Err(invalid("origin must not contain a path"));
        }

        Ok(UpstreamTarget {
            protocol,
            host: host.trim_start_matches('[').trim_end_matches(']').to_string(),
            port: uri.port_u16().unwrap_or_else(|| protocol.default_port()),
            explicit_port: uri.port_u16().is_some(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.target().map(|_| ())
    }
}

/// Parsed upstream origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    explicit_port: bool,
}

impl UpstreamTarget {
    /// `host[:port]` as it should appear in the outbound `Host` header.
    pub fn authority(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if self.explicit_port && self.port != self.protocol.default_port() {
            format!("{host}:{}", self.port)
        } else {
            host
        }
    }

    /// `scheme://authority`, with no trailing slash.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.protocol.as_str(), self.authority())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionPoolConfig {
    #[serde(default = "default_pool_max_idle_per_host")]
    pub max_idle_per_host: usize,

    #[serde(default = "default_pool_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: default_pool_max_idle_per_host(),
            idle_timeout_secs: default_pool_idle_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_pool_max_idle_per_host() -> usize {
    32
}

fn default_pool_idle_timeout() -> u64 {
    90
}

fn default_connect_timeout() -> u64 {
    5
}
