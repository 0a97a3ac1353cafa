//! Fixed CORS allow-list shared by every function.
//!
//! The layer answers every `OPTIONS` request itself with 200, before routing
//! reaches an extractor, so preflights never need a token.

use axum::http::{HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

pub const ALLOWED_HEADERS: [&str; 5] = [
    "authorization",
    "x-client-info",
    "apikey",
    "content-type",
    "x-access-token",
];

pub const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static))
}
