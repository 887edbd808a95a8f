//! Layers shared by every route.
use axum::{body::Body, http::Request};
use tower_http::cors::CorsLayer;
use tracing::Span;

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Request span: method and path only.
pub fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}
