//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the OTLP span exporter and batch tracer provider
//! - Hand the provider to the subscriber so `tracing` spans become OTLP spans
//!
//! Span names come from the `tracing` span name; a span that needs a name
//! only known at runtime sets the `otel.name` field instead.

use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;

use crate::config::TelemetryConfig;
use crate::observability::TelemetryError;

/// Build a batching tracer provider exporting over OTLP/gRPC.
pub fn build_tracer_provider(
    config: &TelemetryConfig,
    resource: Resource,
) -> Result<SdkTracerProvider, TelemetryError> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}
