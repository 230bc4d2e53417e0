use crate::config::{ProxyConfig, UpstreamTarget};
use crate::error::ConfigError;
use crate::proxy::client::{create_http_client, HttpClient};
use std::sync::Arc;
use std::time::Duration;

/// Read-only state shared by every connection task.
///
/// Built once at startup from a validated [`ProxyConfig`]; handlers borrow it
/// and never mutate it, so no locking is involved.
pub struct ProxyContext {
    pub config: Arc<ProxyConfig>,
    pub target: UpstreamTarget,
    /// `scheme://authority` of the upstream, prefixed to forwarded paths
    pub upstream_origin: String,
    pub http_client: HttpClient,
    /// Port the listener is actually bound to (differs from the configured
    /// port only when binding port 0)
    pub listen_port: u16,
}

impl ProxyContext {
    pub fn new(config: ProxyConfig, listen_port: u16) -> Result<Self, ConfigError> {
        config.validate()?;
        let target = config.upstream.target()?;
        let upstream_origin = target.origin();
        let http_client = create_http_client(&config.upstream);

        Ok(Self {
            config: Arc::new(config),
            target,
            upstream_origin,
            http_client,
            listen_port,
        })
    }

    /// Deadline applied to every upstream exchange and probe.
    pub fn upstream_timeout(&self) -> Duration {
        self.config.upstream.timeout()
    }
}
