use super::{DiagnosticResult, ProbeDetail, DNS_TEST_NAME};
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tracing::debug;

/// Resolve `host` to its IPv4 addresses, bounded by `timeout`.
pub async fn probe_dns(host: &str, port: u16, timeout: Duration) -> DiagnosticResult {
    match tokio::time::timeout(timeout, resolve_ipv4(host, port)).await {
        Ok(Ok(addresses)) => {
            debug!("Resolved {} to {:?}", host, addresses);
            DiagnosticResult::success(
                DNS_TEST_NAME,
                ProbeDetail::Resolved {
                    host: host.to_string(),
                    addresses,
                },
            )
        }
        Ok(Err(e)) => DiagnosticResult::failed(DNS_TEST_NAME, e.to_string()),
        Err(_) => DiagnosticResult::failed(
            DNS_TEST_NAME,
            format!(
                "DNS lookup for {host} timed out after {}ms",
                timeout.as_millis()
            ),
        ),
    }
}

async fn resolve_ipv4(host: &str, port: u16) -> io::Result<Vec<Ipv4Addr>> {
    let mut addresses: Vec<Ipv4Addr> = tokio::net::lookup_host((host, port))
        .await?
        .filter_map(|addr| match addr.ip() {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
        .collect();
    addresses.sort();
    addresses.dedup();

    if addresses.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no IPv4 addresses found for {host}"),
        ));
    }
    Ok(addresses)
}
