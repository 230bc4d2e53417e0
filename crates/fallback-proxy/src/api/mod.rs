//! HTTP surface of the proxy.
//!
//! - `router` - path dispatch and uniform CORS handling
//! - `handlers` - locally answered endpoints (`/`, `/health`, `/diagnose`, `/metrics`)
//! - `types` - response bodies and JSON helpers

mod handlers;
mod router;
mod types;

pub use router::{route_request, Route, USERS_PREFIX};
pub use types::iso_timestamp;
