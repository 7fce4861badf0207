//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Telemetry sink → Router → Bind → "Application started" → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Flush telemetry → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Telemetry is initialized before anything that can log or serve
//! - Listener binds last (traffic only when ready)
//! - Telemetry is flushed after the server has stopped

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
