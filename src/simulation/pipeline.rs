//! Multi-stage request pipeline behind `/complex-operation`.
//!
//! # Stages
//! ```text
//! complex_operation (root span)
//!   ├─ database_query      wait 0.1..0.3s
//!   ├─ processing          wait 0.2..0.4s
//!   ├─ async_task1 ┐
//!   ├─ async_task2 ├─ concurrent, wait 0.1..0.5s each, joined before moving on
//!   ├─ async_task3 ┘
//!   ├─ external_api_call   GET external_url with `traceparent`, body parsed as JSON
//!   ├─ final_computation   wait 0.1..0.2s
//!   └─ request_duration    elapsed ms recorded into the duration histogram
//! ```
//!
//! Any failure (outbound request, JSON decode, a sub-task panicking) aborts
//! the pipeline; remaining sub-tasks are cancelled when the join set drops.

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tracing::{info, info_span, Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::observability::propagation::inject_context;
use crate::observability::Telemetry;
use crate::simulation::workload::{random_wait, WaitRange};

/// Label the pipeline records its counter and histogram samples under.
pub const ENDPOINT: &str = "/complex_operation";

pub const DATABASE_QUERY_WAIT: WaitRange = WaitRange::new(0.1, 0.3);
pub const PROCESSING_WAIT: WaitRange = WaitRange::new(0.2, 0.4);
pub const SUB_TASK_WAIT: WaitRange = WaitRange::new(0.1, 0.5);
pub const FINAL_COMPUTATION_WAIT: WaitRange = WaitRange::new(0.1, 0.2);

/// Names of the concurrently executed sub-tasks.
pub const SUB_TASKS: [&str; 3] = ["task1", "task2", "task3"];

/// Errors that abort the pipeline.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The outbound request could not be sent or its body not read.
    #[error("external API request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// The outbound response body was not JSON.
    #[error("external API returned invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// A fanned-out sub-task did not complete.
    #[error("sub-task failed: {0}")]
    Task(#[from] JoinError),
}

/// Body returned by a successful run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComplexOperationResponse {
    pub message: &'static str,
    pub external_data: Value,
}

/// The pipeline and its collaborators.
#[derive(Clone)]
pub struct ComplexOperation {
    client: reqwest::Client,
    external_url: Arc<str>,
    telemetry: Arc<Telemetry>,
}

impl ComplexOperation {
    pub fn new(client: reqwest::Client, external_url: impl Into<Arc<str>>, telemetry: Arc<Telemetry>) -> Self {
        Self {
            client,
            external_url: external_url.into(),
            telemetry,
        }
    }

    /// Run every stage under one root span.
    pub async fn run(&self) -> Result<ComplexOperationResponse, SimulationError> {
        let start = Instant::now();

        async move {
            info!("Starting complex operation");

            async {
                random_wait(DATABASE_QUERY_WAIT).await;
                info!("Database query completed");
            }
            .instrument(info_span!("database_query"))
            .await;

            async {
                random_wait(PROCESSING_WAIT).await;
                info!("Data processing completed");
            }
            .instrument(info_span!("processing"))
            .await;

            fan_out(&SUB_TASKS).await?;

            let external_data = self
                .external_api_call()
                .instrument(info_span!("external_api_call", url = %self.external_url))
                .await?;

            async {
                random_wait(FINAL_COMPUTATION_WAIT).await;
                info!("Final computation completed");
            }
            .instrument(info_span!("final_computation"))
            .await;

            info_span!("request_duration").in_scope(|| {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                self.telemetry.record_duration(ENDPOINT, elapsed_ms);
                info!(elapsed_ms, "Complex operation duration recorded");
            });

            Ok::<_, SimulationError>(ComplexOperationResponse {
                message: "Complex operation completed",
                external_data,
            })
        }
        .instrument(info_span!("complex_operation"))
        .await
    }

    async fn external_api_call(&self) -> Result<Value, SimulationError> {
        let mut headers = HeaderMap::new();
        inject_context(&Span::current().context(), &mut headers);

        let response = self.client.get(&*self.external_url).headers(headers).send().await?;
        let status = response.status();
        info!(
            url = %self.external_url,
            status = status.as_u16(),
            "External API call to {} completed with status {}",
            self.external_url,
            status.as_u16()
        );

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Run one sub-task per name concurrently and wait for all of them.
///
/// Completion order decides which failure is reported when several fail.
pub async fn fan_out(names: &[&'static str]) -> Result<(), SimulationError> {
    let mut tasks = JoinSet::new();
    for &name in names {
        let span = info_span!("async_operation", otel.name = %format!("async_{name}"), task = name);
        tasks.spawn(async_operation(name).instrument(span));
    }

    while let Some(joined) = tasks.join_next().await {
        joined?;
    }
    Ok(())
}

async fn async_operation(name: &'static str) {
    random_wait(SUB_TASK_WAIT).await;
    info!(task = name, "Async operation {} completed", name);
}
