//! Request forwarding to the upstream origin and the substitute fallback.

use super::client::HttpClient;
use super::context::ProxyContext;
use super::headers::{
    forwardable_request_headers, strip_hop_by_hop, ProxyHeadersExt, VALUE_JSON, VALUE_TRUE,
    X_PROXY_FALLBACK,
};
use super::response_ext::{ProxyBody, ResponseExt};
use crate::error::{error_chain, UpstreamError};
use crate::metrics;
use crate::substitute::substitute_body;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header;
use hyper::{Request, Response};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Forward a request to `upstream_origin`, keeping its method, path, query
/// and headers, and buffer the upstream response.
///
/// The whole exchange (connect, TLS, response head and body) must finish
/// within `timeout`. Any upstream status, 4xx/5xx included, is `Ok`.
pub async fn forward_request(
    http_client: &HttpClient,
    upstream_origin: &str,
    req: Request<ProxyBody>,
    timeout: Duration,
) -> Result<Response<Full<Bytes>>, UpstreamError> {
    let (parts, body) = req.into_parts();
    let upstream_path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let full_uri = format!("{upstream_origin}{upstream_path}");

    debug!("Forwarding {} to: {}", parts.method, full_uri);

    let mut upstream_req = Request::builder().method(parts.method).uri(full_uri);
    if let Some(headers) = upstream_req.headers_mut() {
        *headers = forwardable_request_headers(&parts.headers);
    }
    let upstream_req = upstream_req.body(body)?;

    let exchange = async {
        let upstream_response = http_client.request(upstream_req).await?;
        let (mut parts, body) = upstream_response.into_parts();
        let body_bytes = body.collect().await?.to_bytes();

        // The relayed body is re-framed by our own connection.
        strip_hop_by_hop(&mut parts.headers);

        Ok::<_, UpstreamError>(Response::from_parts(parts, Full::new(body_bytes)))
    };

    tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| UpstreamError::Timeout(timeout))?
}

/// The substitute users response: 200 with the fixed JSON array.
pub fn fallback_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(substitute_body()));
    response.set_header(&header::CONTENT_TYPE, &VALUE_JSON);
    response.set_header(&X_PROXY_FALLBACK, &VALUE_TRUE);
    response
}

/// Proxy a `/users` request, answering with substitute data if the upstream
/// cannot be reached. Never produces an error status of its own.
pub async fn handle_users(ctx: &ProxyContext, req: Request<ProxyBody>) -> Response<ProxyBody> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    match forward_request(
        &ctx.http_client,
        &ctx.upstream_origin,
        req,
        ctx.upstream_timeout(),
    )
    .await
    {
        Ok(response) => {
            let status = response.status().as_u16();
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
            metrics::record_upstream_duration(&method, status, duration_ms);
            debug!(
                "Relayed {} {} -> {} ({:.1}ms)",
                method, path, status, duration_ms
            );
            response.into_boxed()
        }
        Err(e) => {
            warn!(
                reason = e.reason(),
                "{} unavailable for {} {}, serving substitute user data: {}",
                ctx.target.host,
                method,
                path,
                error_chain(&e)
            );
            metrics::record_fallback(e.reason());
            fallback_response().into_boxed()
        }
    }
}
