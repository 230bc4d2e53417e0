//! Error types for configuration loading and upstream exchanges.

use std::time::Duration;
use thiserror::Error;

/// Failures while loading or validating [`crate::config::ProxyConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid upstream URL '{url}': {reason}")]
    InvalidUpstream { url: String, reason: String },

    #[error("unsupported upstream protocol scheme: {0}")]
    UnsupportedScheme(String),

    #[error("upstream timeout must be greater than zero")]
    ZeroTimeout,

    #[error("listen host '{0}' is not an IP address")]
    InvalidListenHost(String),
}

/// Transport-level failures talking to the upstream origin.
///
/// Any of these turns a proxied request into a fallback response. An upstream
/// that answers with a 4xx/5xx status is not an error and never shows up here.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("upstream connection failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read upstream response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("failed to build upstream request: {0}")]
    Request(#[from] hyper::http::Error),
}

impl UpstreamError {
    /// Short label used for metrics and log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Transport(e) if e.is_connect() => "connect",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Body(_) => "body",
            UpstreamError::Request(_) => "request",
        }
    }
}

/// Render an error together with its `source()` chain, e.g.
/// `client error (Connect): tcp connect error: Connection refused`.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}
