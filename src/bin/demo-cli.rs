use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use serde_json::Value;

use otel_demo::http::DEMO_ROUTES;

#[derive(Parser)]
#[command(name = "demo-cli")]
#[command(about = "Traffic generator for the OpenTelemetry demo service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single GET to one route
    Call {
        /// Route path, e.g. /complex-operation
        route: String,
    },
    /// Spread many GETs over concurrent workers
    Load {
        /// Total number of requests
        #[arg(short = 'n', long, default_value_t = 100)]
        requests: usize,

        /// Number of concurrent workers
        #[arg(short, long, default_value_t = 10)]
        concurrency: usize,

        /// Routes to cycle through (repeatable); every demo route when omitted
        #[arg(short, long = "route")]
        routes: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/').to_string();

    match cli.command {
        Commands::Call { route } => {
            let start = Instant::now();
            let res = client.get(format!("{}{}", base, route)).send().await?;
            let latency = start.elapsed();
            print_response(res, latency).await?;
        }
        Commands::Load {
            requests,
            concurrency,
            routes,
        } => {
            let routes: Vec<String> = if routes.is_empty() {
                DEMO_ROUTES.iter().map(|r| r.to_string()).collect()
            } else {
                routes
            };
            run_load(client, base, routes, requests, concurrency.max(1)).await;
        }
    }

    Ok(())
}

async fn print_response(
    res: reqwest::Response,
    latency: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("Status:  {}", status);
    println!("Latency: {:?}", latency);

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

async fn run_load(
    client: reqwest::Client,
    base: String,
    routes: Vec<String>,
    requests: usize,
    concurrency: usize,
) {
    let next = Arc::new(AtomicUsize::new(0));
    let routes = Arc::new(routes);
    let start = Instant::now();

    let mut workers = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let base = base.clone();
        let routes = routes.clone();
        let next = next.clone();
        workers.push(tokio::spawn(async move {
            let mut results = Vec::new();
            loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                if i >= requests {
                    break;
                }
                let route = &routes[i % routes.len()];
                let req_start = Instant::now();
                let outcome = match client.get(format!("{}{}", base, route)).send().await {
                    Ok(res) => res.status().as_u16().to_string(),
                    Err(_) => "error".to_string(),
                };
                results.push((outcome, req_start.elapsed()));
            }
            results
        }));
    }

    let mut statuses: BTreeMap<String, usize> = BTreeMap::new();
    let mut latencies = Vec::new();
    for worker in workers {
        match worker.await {
            Ok(results) => {
                for (outcome, latency) in results {
                    *statuses.entry(outcome).or_default() += 1;
                    latencies.push(latency);
                }
            }
            Err(e) => eprintln!("Worker failed: {}", e),
        }
    }

    let duration = start.elapsed();
    println!("\n--- Load Results ---");
    println!("Total Requests: {}", requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", latencies.len() as f64 / duration.as_secs_f64());
    for (status, count) in &statuses {
        println!("Status {:>6}:  {}", status, count);
    }

    if latencies.is_empty() {
        println!("No requests completed");
        return;
    }

    latencies.sort();
    println!("P50 Latency:    {:?}", percentile(&latencies, 0.50));
    println!("P95 Latency:    {:?}", percentile(&latencies, 0.95));
    println!("P99 Latency:    {:?}", percentile(&latencies, 0.99));
    println!("--------------------\n");
}

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let idx = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[idx]
}
