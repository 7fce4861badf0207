//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber
//! - Bridge `tracing` events to OTLP log records
//! - Configure log level from config or `RUST_LOG`
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development
//! - The OTLP bridge never sees events from the exporter's own transport,
//!   which would otherwise feed back into itself

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, WithExportConfig};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, ObservabilityConfig, TelemetryConfig};
use crate::observability::{TelemetryError, INSTRUMENTATION_SCOPE};

/// Targets excluded from the OTLP log bridge.
const BRIDGE_EXCLUDED_TARGETS: &[&str] = &["hyper", "tonic", "h2", "tower", "reqwest", "opentelemetry"];

/// Build a batching logger provider exporting over OTLP/gRPC.
pub fn build_logger_provider(
    config: &TelemetryConfig,
    resource: Resource,
) -> Result<SdkLoggerProvider, TelemetryError> {
    let exporter = LogExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    Ok(SdkLoggerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

/// Console filter: `RUST_LOG` if set, otherwise the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> Result<EnvFilter, TelemetryError> {
    Ok(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?)
}

fn bridge_filter(config: &ObservabilityConfig) -> Result<EnvFilter, TelemetryError> {
    let mut filter = EnvFilter::try_new(&config.log_level)?;
    for target in BRIDGE_EXCLUDED_TARGETS {
        filter = filter.add_directive(format!("{target}=off").parse()?);
    }
    Ok(filter)
}

/// Install the global subscriber.
///
/// Layers: level filter, OTLP span layer (if traces are exported), OTLP log
/// bridge (if logs are exported), and one console formatter.
pub fn init_subscriber(
    config: &ObservabilityConfig,
    tracer_provider: Option<&SdkTracerProvider>,
    logger_provider: Option<&SdkLoggerProvider>,
) -> Result<(), TelemetryError> {
    let span_layer = tracer_provider
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(INSTRUMENTATION_SCOPE)));

    let log_bridge = match logger_provider {
        Some(provider) => Some(OpenTelemetryTracingBridge::new(provider).with_filter(bridge_filter(config)?)),
        None => None,
    };

    let (pretty, json) = match config.log_format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter(config)?)
        .with(span_layer)
        .with(log_bridge)
        .with(pretty)
        .with(json)
        .try_init()?;

    Ok(())
}
