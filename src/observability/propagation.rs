//! W3C Trace Context propagation over HTTP headers.
//!
//! Inbound requests continue the caller's trace through `traceparent`;
//! outbound calls carry the current span so the callee joins the same trace.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector};
use opentelemetry::{global, Context};
use opentelemetry_sdk::propagation::TraceContextPropagator;

/// Register the W3C `traceparent`/`tracestate` propagator process-wide.
pub fn install() {
    global::set_text_map_propagator(TraceContextPropagator::new());
}

/// Read the remote parent context from request headers.
///
/// Returns an empty context when no valid `traceparent` is present.
pub fn extract_context(headers: &HeaderMap) -> Context {
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(headers)))
}

/// Write `cx` into outbound request headers.
pub fn inject_context(cx: &Context, headers: &mut HeaderMap) {
    global::get_text_map_propagator(|propagator| {
        propagator.inject_context(cx, &mut HeaderInjector(headers))
    });
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        let (Ok(name), Ok(value)) = (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(&value)) else {
            return;
        };
        self.0.insert(name, value);
    }
}
