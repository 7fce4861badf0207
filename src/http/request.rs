//! Request identification and the per-request HTTP span.
//!
//! # Responsibilities
//! - Assign a UUID `x-request-id` when the client did not send one
//! - Echo the request ID on the response
//! - Open the server span every handler span nests under, continuing the
//!   caller's trace when a `traceparent` header is present
//!
//! # Design Decisions
//! - Request ID added as early as possible so the HTTP span can carry it
//! - The span is INFO so it survives the default filter and is exported

use axum::http::{HeaderName, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use opentelemetry::trace::TraceContextExt;
use tracing::{Level, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::observability::propagation::extract_context;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer that assigns a request ID when absent.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Builds the `http_request` span for each incoming request.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestSpan;

impl<B> MakeSpan<B> for MakeRequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");

        let span = tracing::info_span!(
            "http_request",
            otel.name = %format!("{} {}", request.method(), request.uri().path()),
            otel.kind = "server",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
        );

        let remote = extract_context(request.headers());
        if remote.has_active_span() {
            span.set_parent(remote);
        }
        span
    }
}

/// HTTP tracing middleware: one span per request, one INFO line per response.
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeRequestSpan> {
    TraceLayer::new_for_http()
        .make_span_with(MakeRequestSpan)
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}
