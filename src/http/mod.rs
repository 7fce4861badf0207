//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID assigned, HTTP span opened)
//!     → handlers.rs (count, log, simulate, respond)
//!     → response.rs (failures mapped to a generic 500)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::AppError;
pub use server::{AppState, HttpServer};

/// Every route the service answers, in the order they are registered.
pub const DEMO_ROUTES: &[&str] = &[
    "/health",
    "/",
    "/io_task",
    "/cpu_task",
    "/random_status",
    "/random_sleep",
    "/error_test",
    "/complex-operation",
];
