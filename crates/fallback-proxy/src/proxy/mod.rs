//! Proxy server module.
//!
//! This module provides the proxy server implementation:
//! - `server` - ProxyServer struct and accept loop
//! - `context` - read-only state shared by all connections
//! - `forwarding` - `/users` forwarding with substitute-data fallback
//! - `client` - pooled HTTP/HTTPS client for the upstream
//! - `headers` - header constants, CORS and hop-by-hop handling
//! - `network` - listener socket setup

mod client;
mod context;
mod forwarding;
pub(crate) mod headers;
mod network;
mod response_ext;
mod server;

pub use client::{create_http_client, HttpClient};
pub use context::ProxyContext;
pub use forwarding::{fallback_response, forward_request, handle_users};
pub use response_ext::{empty_body, ProxyBody, ResponseExt};
pub use server::{ProxyServer, SHUTDOWN_GRACE_PERIOD};
