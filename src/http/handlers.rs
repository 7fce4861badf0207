//! Demo route handlers.
//!
//! Each handler counts itself first, then logs, simulates and answers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::http::response::AppError;
use crate::http::server::AppState;
use crate::simulation::{self, ComplexOperationResponse};

/// Iterations of the `/cpu_task` busy loop.
pub const CPU_TASK_ITERATIONS: u64 = 1_000;

/// Upper bound, in whole seconds, of the `/random_sleep` wait.
pub const RANDOM_SLEEP_MAX_SECS: u64 = 5;

#[derive(Debug, Serialize)]
pub struct PathEcho {
    pub path: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    state.telemetry.record_request("/health");
    Json(json!({ "message": "I'm healthy" }))
}

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    state.telemetry.record_request("/");
    info!("Hello World");
    Json(json!({ "Hello": "World" }))
}

pub async fn io_task(State(state): State<AppState>) -> &'static str {
    state.telemetry.record_request("/io_task");
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    error!("io task");
    "IO bound task finish!"
}

pub async fn cpu_task(State(state): State<AppState>) -> &'static str {
    state.telemetry.record_request("/cpu_task");
    let _ = simulation::cpu_burn(CPU_TASK_ITERATIONS);
    info!("cpu task");
    "CPU bound task finish!"
}

/// Always 200 despite the name; the status is never randomized.
pub async fn random_status(State(state): State<AppState>) -> Json<PathEcho> {
    state.telemetry.record_request("/random_status");
    error!("random status");
    Json(PathEcho {
        path: "/random_status",
    })
}

pub async fn random_sleep(State(state): State<AppState>) -> Json<PathEcho> {
    state.telemetry.record_request("/random_sleep");
    let wait = simulation::random_whole_secs(RANDOM_SLEEP_MAX_SECS);
    tokio::time::sleep(wait).await;
    info!(slept_secs = wait.as_secs(), "random sleep");
    Json(PathEcho {
        path: "/random_sleep",
    })
}

pub async fn error_test(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.telemetry.record_request("/error_test");
    error!("got error!!!!");
    Err(AppError::Intentional("value error"))
}

pub async fn complex_operation(
    State(state): State<AppState>,
) -> Result<Json<ComplexOperationResponse>, AppError> {
    state.telemetry.record_request(simulation::pipeline::ENDPOINT);
    let response = state.complex_operation.run().await?;
    Ok(Json(response))
}
