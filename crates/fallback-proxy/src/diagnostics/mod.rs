//! Upstream diagnostics.
//!
//! Two independent, best-effort probes of the upstream origin:
//! - `dns` - resolve the upstream host to IPv4 addresses
//! - `reachability` - send a `HEAD /` to the upstream and report what came back
//!
//! Probes never return errors. Every failure is captured in the
//! [`DiagnosticResult`] so the report is always complete.

mod dns;
mod reachability;

pub use dns::probe_dns;
pub use reachability::probe_reachability;

use crate::proxy::ProxyContext;
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

pub const DNS_TEST_NAME: &str = "DNS Resolution";
pub const REACHABILITY_TEST_NAME: &str = "HTTPS Reachability";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Success,
    Failed,
}

/// What a probe observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProbeDetail {
    Resolved {
        host: String,
        addresses: Vec<Ipv4Addr>,
    },
    Response {
        url: String,
        #[serde(rename = "statusCode")]
        status_code: u16,
        headers: BTreeMap<String, String>,
    },
    Error {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub test_name: &'static str,
    pub status: ProbeStatus,
    pub detail: ProbeDetail,
}

impl DiagnosticResult {
    pub fn success(test_name: &'static str, detail: ProbeDetail) -> Self {
        Self {
            test_name,
            status: ProbeStatus::Success,
            detail,
        }
    }

    pub fn failed(test_name: &'static str, error: impl Into<String>) -> Self {
        Self {
            test_name,
            status: ProbeStatus::Failed,
            detail: ProbeDetail::Error {
                error: error.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub timestamp: String,
    pub tests: Vec<DiagnosticResult>,
}

/// Run both probes concurrently against the configured upstream.
///
/// The report always holds exactly two results: DNS first, reachability second.
pub async fn run_diagnostics(ctx: &ProxyContext) -> DiagnosticReport {
    let timeout = ctx.upstream_timeout();
    let (dns, reachability) = tokio::join!(
        probe_dns(&ctx.target.host, ctx.target.port, timeout),
        probe_reachability(&ctx.http_client, &ctx.target, timeout),
    );

    DiagnosticReport {
        timestamp: crate::api::iso_timestamp(),
        tests: vec![dns, reachability],
    }
}
