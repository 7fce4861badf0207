//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::DemoConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, trace_layer};
use crate::observability::Telemetry;
use crate::simulation::ComplexOperation;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<Telemetry>,
    pub complex_operation: ComplexOperation,
}

impl AppState {
    pub fn new(config: &DemoConfig, telemetry: Arc<Telemetry>) -> Self {
        let complex_operation = ComplexOperation::new(
            reqwest::Client::new(),
            config.simulation.external_url.as_str(),
            telemetry.clone(),
        );

        Self {
            telemetry,
            complex_operation,
        }
    }
}

/// HTTP server for the demo service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and sink.
    pub fn new(config: DemoConfig, telemetry: Arc<Telemetry>) -> Self {
        let state = AppState::new(&config, telemetry);
        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/", get(handlers::root))
            .route("/io_task", get(handlers::io_task))
            .route("/cpu_task", get(handlers::cpu_task))
            .route("/random_status", get(handlers::random_status))
            .route("/random_sleep", get(handlers::random_sleep))
            .route("/error_test", get(handlers::error_test))
            .route("/complex-operation", get(handlers::complex_operation))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(trace_layer())
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router, for driving requests in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
