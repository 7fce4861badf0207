//! Failure responses.
//!
//! # Responsibilities
//! - Map every handler failure to a generic `500 Internal Server Error`
//! - Log the cause once, inside the request span
//!
//! # Design Decisions
//! - No structured error bodies: callers only learn that the request failed
//! - Nothing is retried or downgraded to partial success

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::simulation::SimulationError;

/// Errors a handler can end with.
#[derive(Debug, Error)]
pub enum AppError {
    /// Deliberate failure raised by the error-test route.
    #[error("value error: {0}")]
    Intentional(&'static str),

    /// The complex operation aborted.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
