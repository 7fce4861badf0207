//! Simulated workloads behind the demo endpoints.
//!
//! # Data Flow
//! ```text
//! handler
//!     → workload.rs (fixed/random waits, CPU loop)
//!     → pipeline.rs (complex operation: staged spans, fan-out, outbound call)
//!     → result handed back to the handler for serialization
//! ```
//!
//! # Design Decisions
//! - Every wait is a cooperative `tokio::time::sleep`; nothing blocks a worker
//! - No timeouts, retries or cancellation: each stage runs to completion
//! - The fan-out is structured: the pipeline does not continue until every
//!   sub-task has been joined

pub mod pipeline;
pub mod workload;

pub use pipeline::{ComplexOperation, ComplexOperationResponse, SimulationError};
pub use workload::{cpu_burn, random_wait, random_whole_secs, WaitRange};
