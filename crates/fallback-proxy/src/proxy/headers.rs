//! Header names, values and helpers shared by the proxy and API handlers.
//!
//! Static names and values avoid runtime `.parse().unwrap()` calls; the
//! extension trait keeps call sites short for both full responses and
//! response `Parts`.

use hyper::header::{self, HeaderMap, HeaderName, HeaderValue};
use hyper::http::response::Parts;
use hyper::Response;

/// Marks a response built from substitute data rather than the upstream.
pub static X_PROXY_FALLBACK: HeaderName = HeaderName::from_static("x-proxy-fallback");

pub static VALUE_TRUE: HeaderValue = HeaderValue::from_static("true");
pub static VALUE_ANY_ORIGIN: HeaderValue = HeaderValue::from_static("*");
pub static VALUE_JSON: HeaderValue = HeaderValue::from_static("application/json");
pub static VALUE_ALLOWED_METHODS: HeaderValue =
    HeaderValue::from_static("GET,HEAD,PUT,PATCH,POST,DELETE");

/// Connection-scoped headers that must not be forwarded by a proxy (RFC 9110 §7.6.1).
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Headers copied from an inbound request to the upstream request.
///
/// `Host` is dropped so the client derives it from the upstream URI
/// (change-origin), and hop-by-hop headers are dropped as well.
pub fn forwardable_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    forwarded.remove(header::HOST);
    strip_hop_by_hop(&mut forwarded);
    forwarded
}

/// Remove the fixed hop-by-hop headers plus any header the `Connection`
/// header names as connection-scoped.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let mut scoped = connection_listed(headers);
    scoped.extend(
        headers
            .keys()
            .filter(|name| is_hop_by_hop(name))
            .cloned(),
    );
    for name in scoped {
        headers.remove(name);
    }
}

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Header names listed in every `Connection` header value. Tokens that are
/// not valid header names are ignored.
fn connection_listed(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect()
}

/// Extension trait for inserting proxy headers into responses.
pub trait ProxyHeadersExt {
    /// Insert a header with a static name and value.
    fn set_header(&mut self, name: &HeaderName, value: &HeaderValue);

    /// Allow any origin, keeping an origin policy the upstream already chose.
    fn allow_any_origin(&mut self);
}

impl<B> ProxyHeadersExt for Response<B> {
    fn set_header(&mut self, name: &HeaderName, value: &HeaderValue) {
        self.headers_mut().insert(name.clone(), value.clone());
    }

    fn allow_any_origin(&mut self) {
        allow_any_origin(self.headers_mut());
    }
}

impl ProxyHeadersExt for Parts {
    fn set_header(&mut self, name: &HeaderName, value: &HeaderValue) {
        self.headers.insert(name.clone(), value.clone());
    }

    fn allow_any_origin(&mut self) {
        allow_any_origin(&mut self.headers);
    }
}

fn allow_any_origin(headers: &mut HeaderMap) {
    headers
        .entry(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert_with(|| VALUE_ANY_ORIGIN.clone());
}
