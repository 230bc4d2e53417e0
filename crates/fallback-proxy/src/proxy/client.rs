//! HTTP client creation and configuration.
//!
//! One pooled client is shared by the proxy handler and the reachability
//! probe. It speaks HTTP/1.1 over plain TCP or TLS depending on the
//! upstream URL scheme.

use super::response_ext::ProxyBody;
use crate::config::UpstreamConfig;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use tracing::{info, warn};

/// Type alias for the HTTP client used by the proxy.
pub type HttpClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, ProxyBody>;

/// Create a shared HTTP client with connection pooling.
pub fn create_http_client(upstream: &UpstreamConfig) -> HttpClient {
    // Another component may have installed a provider already; either way one is set.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let pool = &upstream.connection_pool;

    let mut http_connector = HttpConnector::new();
    http_connector.set_connect_timeout(Some(Duration::from_secs(pool.connect_timeout_secs)));
    http_connector.enforce_http(false); // Allow both HTTP and HTTPS

    let tls_builder = match hyper_rustls::HttpsConnectorBuilder::new().with_native_roots() {
        Ok(builder) => builder,
        Err(e) => {
            warn!(
                "Failed to load native root certificates ({}); HTTPS upstreams will fail verification",
                e
            );
            hyper_rustls::HttpsConnectorBuilder::new().with_tls_config(
                rustls::ClientConfig::builder()
                    .with_root_certificates(rustls::RootCertStore::empty())
                    .with_no_client_auth(),
            )
        }
    };

    let https_connector = tls_builder
        .https_or_http()
        .enable_http1()
        .wrap_connector(http_connector);

    let http_client = Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(pool.idle_timeout_secs))
        .pool_max_idle_per_host(pool.max_idle_per_host)
        .build(https_connector);

    info!(
        "Connection pool configured (HTTP/1.1): max_idle={}, idle_timeout={}s, connect_timeout={}s",
        pool.max_idle_per_host, pool.idle_timeout_secs, pool.connect_timeout_secs
    );

    http_client
}
