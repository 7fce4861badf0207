//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_request_count` (counter, unit `1`): requests by `endpoint`
//! - `http_request_duration` (histogram, unit `milliseconds`): wall-clock
//!   latency by `endpoint`, recorded only by the complex operation
//!
//! Every recording goes to the OpenTelemetry meter (exported over OTLP) and
//! to the `metrics` facade, which feeds the optional Prometheus scrape
//! endpoint. Without an installed recorder the facade calls are no-ops.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::Unit;
use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::KeyValue;
use opentelemetry_otlp::{MetricExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::Resource;

use crate::config::TelemetryConfig;
use crate::observability::TelemetryError;

pub const REQUEST_COUNT: &str = "http_request_count";
pub const REQUEST_DURATION: &str = "http_request_duration";

/// Attribute key carried by both instruments.
pub const ENDPOINT_LABEL: &str = "endpoint";

/// Per-process instrument handles shared by every handler.
///
/// Built once at startup and injected through router state. Instrument
/// handles are internally synchronized, so `&self` recording is enough.
#[derive(Clone)]
pub struct Telemetry {
    request_count: Counter<u64>,
    request_duration: Histogram<f64>,
}

impl Telemetry {
    /// Create the instruments on the given meter.
    pub fn new(meter: &Meter) -> Self {
        let request_count = meter
            .u64_counter(REQUEST_COUNT)
            .with_description("Number of HTTP requests")
            .with_unit("1")
            .build();

        let request_duration = meter
            .f64_histogram(REQUEST_DURATION)
            .with_description("Duration of HTTP requests")
            .with_unit("milliseconds")
            .build();

        Self {
            request_count,
            request_duration,
        }
    }

    /// Count one request against `endpoint`.
    pub fn record_request(&self, endpoint: &'static str) {
        self.request_count
            .add(1, &[KeyValue::new(ENDPOINT_LABEL, endpoint)]);
        metrics::counter!(REQUEST_COUNT, ENDPOINT_LABEL => endpoint).increment(1);
    }

    /// Record one latency sample, in milliseconds, against `endpoint`.
    pub fn record_duration(&self, endpoint: &'static str, millis: f64) {
        self.request_duration
            .record(millis, &[KeyValue::new(ENDPOINT_LABEL, endpoint)]);
        metrics::histogram!(REQUEST_DURATION, ENDPOINT_LABEL => endpoint).record(millis);
    }
}

/// Build the meter provider. With metric export disabled the provider has no
/// reader, so instruments still work but nothing leaves the process over OTLP.
pub fn build_meter_provider(
    config: &TelemetryConfig,
    resource: Resource,
) -> Result<SdkMeterProvider, TelemetryError> {
    let builder = SdkMeterProvider::builder().with_resource(resource);
    if !config.metrics_enabled {
        return Ok(builder.build());
    }

    let exporter = MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let reader = PeriodicReader::builder(exporter)
        .with_interval(Duration::from_secs(config.metric_export_interval_secs))
        .build();

    Ok(builder.with_reader(reader).build())
}

/// Register descriptions with whatever `metrics` recorder is installed.
pub fn describe_metrics() {
    metrics::describe_counter!(REQUEST_COUNT, Unit::Count, "Number of HTTP requests");
    metrics::describe_histogram!(
        REQUEST_DURATION,
        Unit::Milliseconds,
        "Duration of HTTP requests"
    );
}

/// Install the Prometheus recorder and its scrape listener.
pub fn init_prometheus(addr: SocketAddr) -> Result<(), TelemetryError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();

    tracing::info!(address = %addr, "Prometheus scrape endpoint listening");
    Ok(())
}
