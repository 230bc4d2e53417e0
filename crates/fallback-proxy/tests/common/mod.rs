//! Shared helpers for the integration tests: a scriptable local upstream and a
//! proxy bound to an ephemeral port.

#![allow(dead_code)]

use bytes::Bytes;
use fallback_proxy::{ProxyConfig, ProxyServer};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::HeaderMap;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// What the upstream saw for one request.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

type Responder = dyn Fn(&SeenRequest, usize) -> Response<Full<Bytes>> + Send + Sync;

pub struct TestUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl TestUpstream {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

/// Start an upstream that answers every request with `respond(request, hit_number)`.
pub async fn start_upstream<F>(respond: F) -> TestUpstream
where
    F: Fn(&SeenRequest, usize) -> Response<Full<Bytes>> + Send + Sync + 'static,
{
    start_delayed_upstream(Duration::ZERO, respond).await
}

/// Like [`start_upstream`], but every response is held back for `delay`.
pub async fn start_delayed_upstream<F>(delay: Duration, respond: F) -> TestUpstream
where
    F: Fn(&SeenRequest, usize) -> Response<Full<Bytes>> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let respond: Arc<Responder> = Arc::new(respond);

    {
        let hits = Arc::clone(&hits);
        let seen = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let hits = Arc::clone(&hits);
                let seen = Arc::clone(&seen);
                let respond = Arc::clone(&respond);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let hits = Arc::clone(&hits);
                        let seen = Arc::clone(&seen);
                        let respond = Arc::clone(&respond);
                        async move {
                            let (parts, body) = req.into_parts();
                            let body = body.collect().await.unwrap().to_bytes();
                            let request = SeenRequest {
                                method: parts.method,
                                path_and_query: parts
                                    .uri
                                    .path_and_query()
                                    .map(|pq| pq.to_string())
                                    .unwrap_or_default(),
                                headers: parts.headers,
                                body,
                            };
                            let hit = hits.fetch_add(1, Ordering::SeqCst) + 1;
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                            let response = respond(&request, hit);
                            seen.lock().unwrap().push(request);
                            Ok::<_, Infallible>(response)
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });
    }

    TestUpstream { addr, hits, seen }
}

/// Start an upstream that accepts connections and never answers.
pub async fn start_silent_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    addr
}

/// A URL on a local port nothing listens on.
pub fn refused_upstream_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Proxy configuration for an ephemeral loopback port.
pub fn proxy_config(upstream_url: &str, timeout_ms: u64) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listen.host = "127.0.0.1".to_string();
    config.listen.port = 0;
    config.upstream.url = upstream_url.to_string();
    config.upstream.timeout_ms = timeout_ms;
    config
}

/// Bind the proxy on an ephemeral loopback port and run it in the background.
pub async fn start_proxy(upstream_url: &str, timeout_ms: u64) -> SocketAddr {
    let server = ProxyServer::bind(proxy_config(upstream_url, timeout_ms))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn json_response(status: u16, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
