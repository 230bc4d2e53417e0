//! Response extension traits for common transformations.

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::Response;
use std::convert::Infallible;

/// Body type returned by every handler served by the proxy.
pub type ProxyBody = BoxBody<Bytes, hyper::Error>;

/// Extension trait for `Response<Full<Bytes>>` providing common transformations.
pub trait ResponseExt {
    /// Convert the response body into a boxed body type.
    fn into_boxed(self) -> Response<ProxyBody>;
}

impl ResponseExt for Response<Full<Bytes>> {
    fn into_boxed(self) -> Response<ProxyBody> {
        self.map(|b| BoxBody::new(b.map_err(|never: Infallible| match never {})))
    }
}

/// An empty boxed body, used for outbound HEAD probes and preflight replies.
pub fn empty_body() -> ProxyBody {
    BoxBody::new(Full::new(Bytes::new()).map_err(|never: Infallible| match never {}))
}
