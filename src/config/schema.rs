//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the demo
//! service. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

/// Root configuration for the demo service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// OpenTelemetry export settings.
    pub telemetry: TelemetryConfig,

    /// Local logging and scrape endpoint settings.
    pub observability: ObservabilityConfig,

    /// Parameters of the simulated workloads.
    pub simulation: SimulationConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// OpenTelemetry export configuration.
///
/// Traces, logs and metrics all go to the same OTLP/gRPC collector endpoint
/// and carry the same `service.name` resource attribute.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Value of the `service.name` resource attribute.
    pub service_name: String,

    /// OTLP/gRPC collector endpoint.
    pub otlp_endpoint: String,

    /// Interval between periodic metric exports, in seconds.
    pub metric_export_interval_secs: u64,

    /// Export spans.
    pub traces_enabled: bool,

    /// Export log records.
    pub logs_enabled: bool,

    /// Export metrics.
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "otel-demo-service".to_string(),
            otlp_endpoint: "http://localhost:4317".to_string(),
            metric_export_interval_secs: 10,
            traces_enabled: true,
            logs_enabled: true,
            metrics_enabled: true,
        }
    }
}

/// Console log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Console log format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub prometheus_enabled: bool,

    /// Prometheus scrape endpoint bind address.
    pub prometheus_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            prometheus_enabled: false,
            prometheus_address: "0.0.0.0:9464".to_string(),
        }
    }
}

/// Simulated workload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// URL fetched by the external call stage of `/complex-operation`.
    pub external_url: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            external_url: "https://jsonplaceholder.typicode.com/todos/1".to_string(),
        }
    }
}
