//! GET /diagnose - upstream connectivity report.

use crate::api::types::json_response;
use crate::diagnostics::{run_diagnostics, ProbeStatus};
use crate::proxy::ProxyContext;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tracing::info;

/// Always 200: probe failures are part of the report, not handler errors.
pub async fn handle_diagnose(ctx: &ProxyContext) -> Response<Full<Bytes>> {
    let report = run_diagnostics(ctx).await;

    let failed = report
        .tests
        .iter()
        .filter(|t| t.status == ProbeStatus::Failed)
        .count();
    info!(
        "Diagnostics for {}: {}/{} probes failed",
        ctx.target.host,
        failed,
        report.tests.len()
    );

    json_response(StatusCode::OK, &report)
}
