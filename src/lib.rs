//! OpenTelemetry demo service library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod simulation;

pub use config::DemoConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::Telemetry;
