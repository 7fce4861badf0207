//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers produce:
//!     → tracing events    → logging.rs (console + OTLP log bridge)
//!     → tracing spans     → tracing.rs (OTLP span export)
//!     → Telemetry context → metrics.rs (OTLP meter + Prometheus mirror)
//!
//! Consumers:
//!     → OpenTelemetry collector (OTLP/gRPC, one endpoint for all signals)
//!     → Prometheus scrape endpoint (optional)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Providers are built once in `init` and owned by a `TelemetryGuard`
//! - Instruments are reached through an explicit `Telemetry` value held in
//!   router state, never through the OpenTelemetry globals
//! - Every signal carries the same `service.name` resource
//! - Trace context crosses process boundaries as W3C `traceparent` headers,
//!   the only piece of state registered globally

pub mod logging;
pub mod metrics;
pub mod propagation;
pub mod tracing;

use opentelemetry::metrics::MeterProvider as _;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;

use crate::config::{DemoConfig, TelemetryConfig};

pub use self::metrics::Telemetry;

/// Instrumentation scope used for the tracer and the meter.
pub const INSTRUMENTATION_SCOPE: &str = "otel-demo-service";

/// Errors raised while wiring up the telemetry pipeline.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to install Prometheus exporter: {0}")]
    Prometheus(#[from] metrics_exporter_prometheus::BuildError),
}

/// Owns the OpenTelemetry providers for the lifetime of the process.
///
/// Dropping the guard without calling [`TelemetryGuard::shutdown`] loses
/// whatever is still buffered in the batch processors.
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: SdkMeterProvider,
    logger_provider: Option<SdkLoggerProvider>,
}

impl TelemetryGuard {
    /// Flush and shut down every provider. Logs go last so the warnings
    /// emitted here can still be exported.
    pub fn shutdown(self) {
        if let Some(provider) = self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                ::tracing::warn!(error = %e, "Tracer provider shutdown failed");
            }
        }
        if let Err(e) = self.meter_provider.shutdown() {
            ::tracing::warn!(error = %e, "Meter provider shutdown failed");
        }
        if let Some(provider) = self.logger_provider {
            if let Err(e) = provider.shutdown() {
                ::tracing::warn!(error = %e, "Logger provider shutdown failed");
            }
        }
    }
}

/// Resource attached to every exported span, log record and metric.
pub fn resource(config: &TelemetryConfig) -> Resource {
    Resource::builder()
        .with_service_name(config.service_name.clone())
        .build()
}

/// Build the telemetry sink and install the global tracing subscriber.
///
/// Must run exactly once, before the listener is bound.
pub fn init(config: &DemoConfig) -> Result<(TelemetryGuard, Telemetry), TelemetryError> {
    let resource = resource(&config.telemetry);

    let tracer_provider = if config.telemetry.traces_enabled {
        Some(self::tracing::build_tracer_provider(&config.telemetry, resource.clone())?)
    } else {
        None
    };

    let logger_provider = if config.telemetry.logs_enabled {
        Some(logging::build_logger_provider(&config.telemetry, resource.clone())?)
    } else {
        None
    };

    let meter_provider = self::metrics::build_meter_provider(&config.telemetry, resource)?;

    propagation::install();

    logging::init_subscriber(
        &config.observability,
        tracer_provider.as_ref(),
        logger_provider.as_ref(),
    )?;

    let telemetry = Telemetry::new(&meter_provider.meter(INSTRUMENTATION_SCOPE));

    ::tracing::info!(
        service_name = %config.telemetry.service_name,
        otlp_endpoint = %config.telemetry.otlp_endpoint,
        traces = config.telemetry.traces_enabled,
        logs = config.telemetry.logs_enabled,
        metrics = config.telemetry.metrics_enabled,
        "Telemetry initialized"
    );

    Ok((
        TelemetryGuard {
            tracer_provider,
            meter_provider,
            logger_provider,
        },
        telemetry,
    ))
}
