//! Route dispatch.
//!
//! Exact routes are checked first (`/health`, `/`, `/diagnose`, `/metrics`),
//! then the `/users` prefix. Preflight requests are answered for every path.
//! Anything else gets a JSON 404.

use crate::api::handlers::{diagnose, system};
use crate::api::types::not_found;
use crate::metrics;
use crate::proxy::headers::ProxyHeadersExt;
use crate::proxy::{handle_users, ProxyBody, ProxyContext, ResponseExt};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Body;
use hyper::{Method, Request, Response};
use tracing::debug;

pub const USERS_PREFIX: &str = "/users";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// GET/HEAD /health
    Health,
    /// GET/HEAD /
    Root,
    /// GET/HEAD /diagnose
    Diagnose,
    /// GET /metrics
    Metrics,
    /// Any method on /users or /users/...
    Users,
    /// OPTIONS on any path
    Preflight,
    NotFound,
}

impl Route {
    pub fn resolve(method: &Method, path: &str) -> Self {
        if method == Method::OPTIONS {
            return Route::Preflight;
        }

        let read_only = method == Method::GET || method == Method::HEAD;
        match path {
            "/health" if read_only => Route::Health,
            "/" if read_only => Route::Root,
            "/diagnose" if read_only => Route::Diagnose,
            "/metrics" if method == Method::GET => Route::Metrics,
            _ if is_users_path(path) => Route::Users,
            _ => Route::NotFound,
        }
    }

    /// Metrics label
    pub fn label(&self) -> &'static str {
        match self {
            Route::Health => "health",
            Route::Root => "root",
            Route::Diagnose => "diagnose",
            Route::Metrics => "metrics",
            Route::Users => "users",
            Route::Preflight => "preflight",
            Route::NotFound => "not_found",
        }
    }
}

/// `/users` and everything below it, but not `/usersfoo`.
fn is_users_path(path: &str) -> bool {
    match path.strip_prefix(USERS_PREFIX) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Main request router. Every response leaves with a permissive CORS origin.
pub async fn route_request<B>(ctx: &ProxyContext, req: Request<B>) -> Response<ProxyBody>
where
    B: Body<Data = Bytes, Error = hyper::Error> + Send + Sync + 'static,
{
    let route = Route::resolve(req.method(), req.uri().path());
    debug!("{} {} -> {:?}", req.method(), req.uri().path(), route);

    let mut response = match route {
        Route::Health => system::handle_health(ctx.listen_port).into_boxed(),
        Route::Root => system::handle_root(&ctx.target.host).into_boxed(),
        Route::Diagnose => diagnose::handle_diagnose(ctx).await.into_boxed(),
        Route::Metrics => system::handle_metrics().into_boxed(),
        Route::Preflight => system::handle_preflight(req.headers()).into_boxed(),
        Route::NotFound => not_found(req.uri().path()).into_boxed(),
        Route::Users => handle_users(ctx, req.map(BoxBody::new)).await,
    };

    response.allow_any_origin();
    metrics::record_request(route.label(), response.status().as_u16());
    response
}
