//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize the telemetry sink exactly once
//! - Start the optional Prometheus scrape endpoint
//! - Bind the listener and begin accepting traffic
//! - Flush telemetry after the server stops
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::DemoConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability;

/// Run the service until SIGINT/SIGTERM.
pub async fn run(config: DemoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (guard, telemetry) = observability::init(&config)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        external_url = %config.simulation.external_url,
        "Configuration loaded"
    );

    if config.observability.prometheus_enabled {
        let addr: SocketAddr = config.observability.prometheus_address.parse()?;
        observability::metrics::init_prometheus(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, Arc::new(telemetry));

    tracing::info!(address = %local_addr, "Application started");

    signals::spawn_signal_handler(shutdown);
    let result = server.run(listener, server_shutdown).await;

    guard.shutdown();
    result?;

    Ok(())
}
