use super::{DiagnosticResult, ProbeDetail, REACHABILITY_TEST_NAME};
use crate::config::UpstreamTarget;
use crate::error::error_chain;
use crate::proxy::{empty_body, HttpClient};
use hyper::header::HeaderMap;
use hyper::Request;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Send `HEAD /` to the upstream origin. Any HTTP response counts as
/// reachable, whatever its status.
pub async fn probe_reachability(
    http_client: &HttpClient,
    target: &UpstreamTarget,
    timeout: Duration,
) -> DiagnosticResult {
    let url = format!("{}/", target.origin());

    let request = match Request::head(url.as_str()).body(empty_body()) {
        Ok(request) => request,
        Err(e) => return DiagnosticResult::failed(REACHABILITY_TEST_NAME, e.to_string()),
    };

    match tokio::time::timeout(timeout, http_client.request(request)).await {
        Ok(Ok(response)) => {
            debug!("HEAD {} -> {}", url, response.status());
            DiagnosticResult::success(
                REACHABILITY_TEST_NAME,
                ProbeDetail::Response {
                    url,
                    status_code: response.status().as_u16(),
                    headers: flatten_headers(response.headers()),
                },
            )
        }
        Ok(Err(e)) => DiagnosticResult::failed(
            REACHABILITY_TEST_NAME,
            format!("request to {url} failed: {}", error_chain(&e)),
        ),
        Err(_) => DiagnosticResult::failed(
            REACHABILITY_TEST_NAME,
            format!("request to {url} timed out after {}ms", timeout.as_millis()),
        ),
    }
}

/// Repeated header names are joined with `, `.
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flattened: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers.iter() {
        let value = String::from_utf8_lossy(value.as_bytes());
        match flattened.get_mut(name.as_str()) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                flattened.insert(name.as_str().to_string(), value.into_owned());
            }
        }
    }
    flattened
}
