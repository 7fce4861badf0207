//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs before anything binds or connects
//! - Validate value ranges (export interval > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DemoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::DemoConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if config.telemetry.service_name.trim().is_empty() {
        errors.push(ValidationError {
            field: "telemetry.service_name",
            message: "must not be empty".to_string(),
        });
    }
    check_http_url(&mut errors, "telemetry.otlp_endpoint", &config.telemetry.otlp_endpoint);
    if config.telemetry.metric_export_interval_secs == 0 {
        errors.push(ValidationError {
            field: "telemetry.metric_export_interval_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.observability.prometheus_enabled {
        check_socket_addr(
            &mut errors,
            "observability.prometheus_address",
            &config.observability.prometheus_address,
        );
    }

    check_http_url(&mut errors, "simulation.external_url", &config.simulation.external_url);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if let Err(e) = value.parse::<SocketAddr>() {
        errors.push(ValidationError {
            field,
            message: format!("invalid socket address '{}': {}", value, e),
        });
    }
}

fn check_http_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError {
            field,
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field,
            message: format!("invalid URL '{}': {}", value, e),
        }),
    }
}
