//! Prometheus metrics for the fallback proxy.
//!
//! Tracks handled requests, fallback activations and upstream latency.
use hyper::Method;
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    /// Total number of requests handled, by route and response status
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "fallback_proxy_requests_total",
        "Total number of requests handled by the proxy",
        &["route", "status"]
    )
    .unwrap();

    /// Substitute responses served instead of an upstream response
    pub static ref FALLBACKS_TOTAL: CounterVec = register_counter_vec!(
        "fallback_proxy_fallbacks_total",
        "Total number of substitute responses served because the upstream failed",
        &["reason"]  // reason: timeout|connect|transport|body|request
    )
    .unwrap();

    /// Upstream exchange duration for relayed responses
    pub static ref UPSTREAM_REQUEST_DURATION_MS: HistogramVec = register_histogram_vec!(
        "fallback_proxy_upstream_request_duration_ms",
        "Duration of upstream requests that produced a relayed response",
        &["method", "status"],
        vec![5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0]
    )
    .unwrap();
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

pub fn record_request(route: &str, status: u16) {
    REQUESTS_TOTAL
        .with_label_values(&[route, &status.to_string()])
        .inc();
}

pub fn record_fallback(reason: &str) {
    FALLBACKS_TOTAL.with_label_values(&[reason]).inc();
}

/// Label for a request method. Extension methods collapse into `other` so
/// clients cannot grow the number of series.
pub fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "PATCH" => "PATCH",
        "DELETE" => "DELETE",
        "OPTIONS" => "OPTIONS",
        _ => "other",
    }
}

pub fn record_upstream_duration(method: &Method, status: u16, duration_ms: f64) {
    UPSTREAM_REQUEST_DURATION_MS
        .with_label_values(&[method_label(method), &status.to_string()])
        .observe(duration_ms);
}
