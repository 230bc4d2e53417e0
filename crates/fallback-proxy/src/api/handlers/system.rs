//! System handlers: root info, health, metrics, CORS preflight.

use crate::api::types::*;
use crate::metrics;
use crate::proxy::headers::{VALUE_ALLOWED_METHODS, VALUE_ANY_ORIGIN};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{self, HeaderMap};
use hyper::{Response, StatusCode};

/// GET / - Available endpoints
pub fn handle_root(upstream_host: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "message": "Salesforce Mock API Proxy Server",
        "endpoints": {
            "/users": format!("GET - User data from {} (with fallback)", upstream_host),
            "/health": "GET - Health check status",
            "/diagnose": format!("GET - Connectivity diagnostics for {}", upstream_host),
            "/metrics": "GET - Prometheus metrics"
        }
    });
    json_response(StatusCode::OK, &body)
}

/// GET /health - Liveness of the proxy process itself; the upstream is not checked
pub fn handle_health(port: u16) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            status: "ok",
            timestamp: iso_timestamp(),
            message: "Proxy Server is running",
            port,
        },
    )
}

/// GET /metrics - Prometheus metrics
pub fn handle_metrics() -> Response<Full<Bytes>> {
    build_response_with_headers(
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        metrics::collect_metrics(),
    )
}

/// OPTIONS <any> - CORS preflight. Echoes the requested headers back.
pub fn handle_preflight(request_headers: &HeaderMap) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, VALUE_ANY_ORIGIN.clone());
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        VALUE_ALLOWED_METHODS.clone(),
    );
    if let Some(requested) = request_headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
        headers.insert(
            header::VARY,
            header::HeaderValue::from_static("Access-Control-Request-Headers"),
        );
    }
    response
}
