//! Middleware stack for the ingress server
//!
//! Every request gets an id, a tracing span, and a slot in a bounded pool of
//! in-flight requests. No request deadline is applied; platform calls are
//! bounded by the client timeout.

use axum::{
    body::Body,
    http::{header::HeaderName, Request},
    Router,
};
use tower::{limit::ConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Requests handled at once; further ones wait for a slot
pub const MAX_IN_FLIGHT: usize = 64;

/// Apply middleware stack to the router
pub fn apply_middleware(router: Router<AppState>) -> Router<AppState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(ingress_span)
                    .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT)),
    )
}

/// Span for one ingress request
///
/// Records the path without the query string.
fn ingress_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "ingress",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
