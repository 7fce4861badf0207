//! OpenTelemetry Demo Service
//!
//! An HTTP service whose endpoints simulate latency, CPU load, concurrency
//! and failures so that an observability pipeline has traces, logs and
//! metrics to show.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                  DEMO SERVICE                    │
//!   Request       │  ┌──────────┐   ┌──────────┐   ┌─────────────┐   │
//!   ──────────────┼─▶│   http   │──▶│ handlers │──▶│ simulation  │───┼──▶ external API
//!                 │  │ + req id │   │          │   │  pipeline   │   │
//!   Response      │  └──────────┘   └────┬─────┘   └──────┬──────┘   │
//!   ◀─────────────┼────────────────────── │ ──────────────┘          │
//!                 │                      ▼                           │
//!                 │               ┌─────────────┐                    │
//!                 │               │observability│────────────────────┼──▶ OTLP collector
//!                 │               │ spans/logs/ │                    │
//!                 │               │  metrics    │────────────────────┼──▶ Prometheus scrape
//!                 │               └─────────────┘                    │
//!                 └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use otel_demo::config::{load_config, DemoConfig};
use otel_demo::lifecycle::startup;

#[derive(Parser)]
#[command(name = "otel-demo-service")]
#[command(about = "HTTP service that generates traces, logs and metrics on demand", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => load_config(&path)?,
        None => DemoConfig::default(),
    };

    startup::run(config).await
}
