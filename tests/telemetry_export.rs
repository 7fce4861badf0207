//! What actually leaves the process over OTLP: span tree, log-to-trace
//! correlation, trace-context propagation, instruments and resource.
//!
//! Every test installs a thread-local subscriber whose span layer and log
//! bridge feed in-memory exporters, then drives the router in-process.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use opentelemetry::logs::AnyValue;
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::trace::{SpanId, TraceId, TracerProvider as _};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_sdk::logs::{InMemoryLogExporter, SdkLoggerProvider};
use opentelemetry_sdk::metrics::data::{AggregatedMetrics, Metric, MetricData, ResourceMetrics};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use opentelemetry_sdk::Resource;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;

use common::{get, send, start_mock_upstream, start_recording_upstream, test_config};
use otel_demo::config::TelemetryConfig;
use otel_demo::observability::{self, propagation, Telemetry, INSTRUMENTATION_SCOPE};
use otel_demo::HttpServer;

const SERVICE_NAME: &str = "checkout-demo";
const REMOTE_TRACE: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
const REMOTE_SPAN: &str = "00f067aa0ba902b7";

struct Exported {
    spans: InMemorySpanExporter,
    logs: InMemoryLogExporter,
    metrics: InMemoryMetricExporter,
    tracer_provider: SdkTracerProvider,
    _logger_provider: SdkLoggerProvider,
    meter_provider: SdkMeterProvider,
    telemetry: Arc<Telemetry>,
    _subscriber: DefaultGuard,
}

impl Exported {
    fn install() -> Self {
        propagation::install();

        let resource = observability::resource(&TelemetryConfig {
            service_name: SERVICE_NAME.to_string(),
            ..Default::default()
        });

        let spans = InMemorySpanExporter::default();
        let tracer_provider = SdkTracerProvider::builder()
            .with_simple_exporter(spans.clone())
            .with_resource(resource.clone())
            .build();

        let logs = InMemoryLogExporter::default();
        let logger_provider = SdkLoggerProvider::builder()
            .with_simple_exporter(logs.clone())
            .with_resource(resource.clone())
            .build();

        let metrics = InMemoryMetricExporter::default();
        let meter_provider = SdkMeterProvider::builder()
            .with_reader(PeriodicReader::builder(metrics.clone()).build())
            .with_resource(resource)
            .build();
        let telemetry = Arc::new(Telemetry::new(&meter_provider.meter(INSTRUMENTATION_SCOPE)));

        let subscriber = tracing_subscriber::registry()
            .with(tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer(INSTRUMENTATION_SCOPE)))
            .with(OpenTelemetryTracingBridge::new(&logger_provider));

        Self {
            spans,
            logs,
            metrics,
            tracer_provider,
            _logger_provider: logger_provider,
            meter_provider,
            telemetry,
            _subscriber: tracing::subscriber::set_default(subscriber),
        }
    }

    fn server(&self, external_url: &str) -> HttpServer {
        HttpServer::new(test_config(external_url), self.telemetry.clone())
    }

    fn finished_spans(&self) -> Vec<SpanData> {
        self.tracer_provider.force_flush().unwrap();
        self.spans.get_finished_spans().unwrap()
    }

    fn finished_metrics(&self) -> Vec<ResourceMetrics> {
        self.meter_provider.force_flush().unwrap();
        self.metrics.get_finished_metrics().unwrap()
    }
}

fn span<'a>(spans: &'a [SpanData], name: &str) -> &'a SpanData {
    spans.iter().find(|s| s.name == name).unwrap_or_else(|| {
        let names: Vec<_> = spans.iter().map(|s| s.name.as_ref()).collect();
        panic!("no span named {name} in {names:?}")
    })
}

fn metric<'a>(exported: &'a [ResourceMetrics], name: &str) -> &'a Metric {
    exported
        .iter()
        .flat_map(|rm| rm.scope_metrics())
        .flat_map(|sm| sm.metrics())
        .find(|m| m.name() == name)
        .unwrap_or_else(|| panic!("metric {name} was not exported"))
}

fn service_name(resource: &Resource) -> Option<String> {
    resource
        .iter()
        .find(|(key, _)| key.as_str() == "service.name")
        .map(|(_, value)| value.to_string())
}

async fn complex_operation_with_traceparent(server: &HttpServer) -> StatusCode {
    let request = Request::builder()
        .uri("/complex-operation")
        .header("traceparent", format!("00-{REMOTE_TRACE}-{REMOTE_SPAN}-01"))
        .body(Body::empty())
        .unwrap();
    send(server, request).await.0
}

#[tokio::test]
async fn complex_operation_exports_nested_span_tree() {
    let exported = Exported::install();
    let upstream = start_mock_upstream(200, r#"{"id": 1}"#).await;
    let server = exported.server(&format!("http://{upstream}/todos/1"));

    let (status, _) = get(&server, "/complex-operation").await;
    assert_eq!(status, StatusCode::OK);

    let spans = exported.finished_spans();
    let http = span(&spans, "GET /complex-operation");
    let root = span(&spans, "complex_operation");
    assert_eq!(root.parent_span_id, http.span_context.span_id());

    for stage in [
        "database_query",
        "processing",
        "async_task1",
        "async_task2",
        "async_task3",
        "external_api_call",
        "final_computation",
        "request_duration",
    ] {
        let child = span(&spans, stage);
        assert_eq!(child.parent_span_id, root.span_context.span_id(), "{stage}");
        assert_eq!(child.span_context.trace_id(), root.span_context.trace_id(), "{stage}");
    }
}

#[tokio::test]
async fn logs_carry_the_enclosing_span_context() {
    let exported = Exported::install();
    let upstream = start_mock_upstream(200, r#"{"id": 1}"#).await;
    let server = exported.server(&format!("http://{upstream}/todos/1"));

    let (status, _) = get(&server, "/complex-operation").await;
    assert_eq!(status, StatusCode::OK);

    let spans = exported.finished_spans();
    let database_query = span(&spans, "database_query");

    let logs = exported.logs.get_emitted_logs().unwrap();
    let log = logs
        .iter()
        .find(|log| {
            matches!(log.record.body(), Some(AnyValue::String(body)) if body.as_str() == "Database query completed")
        })
        .expect("database query log exported");

    let trace_context = log.record.trace_context().expect("log is linked to a trace");
    assert_eq!(trace_context.trace_id, database_query.span_context.trace_id());
    assert_eq!(trace_context.span_id, database_query.span_context.span_id());
    assert_eq!(service_name(&log.resource).as_deref(), Some(SERVICE_NAME));
}

#[tokio::test]
async fn inbound_traceparent_becomes_the_request_parent() {
    let exported = Exported::install();
    let server = exported.server("http://127.0.0.1:9/unused");

    let request = Request::builder()
        .uri("/health")
        .header("traceparent", format!("00-{REMOTE_TRACE}-{REMOTE_SPAN}-01"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&server, request).await;
    assert_eq!(status, StatusCode::OK);

    let spans = exported.finished_spans();
    let http = span(&spans, "GET /health");
    assert_eq!(http.span_context.trace_id(), TraceId::from_hex(REMOTE_TRACE).unwrap());
    assert_eq!(http.parent_span_id, SpanId::from_hex(REMOTE_SPAN).unwrap());
}

#[tokio::test]
async fn request_without_traceparent_starts_a_new_trace() {
    let exported = Exported::install();
    let server = exported.server("http://127.0.0.1:9/unused");

    let (status, _) = get(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let spans = exported.finished_spans();
    let http = span(&spans, "GET /health");
    assert_eq!(http.parent_span_id, SpanId::INVALID);
    assert_ne!(http.span_context.trace_id(), TraceId::from_hex(REMOTE_TRACE).unwrap());
}

#[tokio::test]
async fn external_call_forwards_the_trace_upstream() {
    let exported = Exported::install();
    let (upstream, heads) = start_recording_upstream(r#"{"id": 1}"#).await;
    let server = exported.server(&format!("http://{upstream}/todos/1"));

    assert_eq!(complex_operation_with_traceparent(&server).await, StatusCode::OK);

    let spans = exported.finished_spans();
    let external = span(&spans, "external_api_call");
    assert_eq!(external.span_context.trace_id(), TraceId::from_hex(REMOTE_TRACE).unwrap());

    let expected = format!(
        "traceparent: 00-{}-{}-01",
        external.span_context.trace_id(),
        external.span_context.span_id()
    );
    let heads = heads.lock().unwrap();
    assert_eq!(heads.len(), 1);
    assert!(heads[0].contains(&expected), "{expected} not in {}", heads[0]);
}

#[tokio::test]
async fn instruments_export_with_units_and_endpoint_attribute() {
    let exported = Exported::install();
    let upstream = start_mock_upstream(200, r#"{"id": 1}"#).await;
    let server = exported.server(&format!("http://{upstream}/todos/1"));

    get(&server, "/health").await;
    get(&server, "/health").await;
    let (status, _) = get(&server, "/complex-operation").await;
    assert_eq!(status, StatusCode::OK);

    let metrics = exported.finished_metrics();
    assert!(!metrics.is_empty());
    for resource_metrics in &metrics {
        assert_eq!(service_name(resource_metrics.resource()).as_deref(), Some(SERVICE_NAME));
    }

    let count = metric(&metrics, "http_request_count");
    assert_eq!(count.unit(), "1");
    let AggregatedMetrics::U64(MetricData::Sum(sum)) = count.data() else {
        panic!("http_request_count is not a u64 sum");
    };
    let mut per_endpoint: Vec<(String, u64)> = sum
        .data_points()
        .map(|point| {
            let endpoint = point
                .attributes()
                .find(|kv| kv.key.as_str() == "endpoint")
                .map(|kv| kv.value.to_string())
                .expect("endpoint attribute");
            (endpoint, point.value())
        })
        .collect();
    per_endpoint.sort();
    assert_eq!(
        per_endpoint,
        vec![("/complex_operation".to_string(), 1), ("/health".to_string(), 2)]
    );

    let duration = metric(&metrics, "http_request_duration");
    assert_eq!(duration.unit(), "milliseconds");
    let AggregatedMetrics::F64(MetricData::Histogram(histogram)) = duration.data() else {
        panic!("http_request_duration is not an f64 histogram");
    };
    let points: Vec<_> = histogram.data_points().collect();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].count(), 1);
    assert!(points[0].sum() >= 500.0, "sum {}", points[0].sum());
    assert!(points[0]
        .attributes()
        .any(|kv| kv.key.as_str() == "endpoint" && kv.value.as_str() == "/complex_operation"));
}
