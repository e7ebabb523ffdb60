//! Metricscache CLI
//!
//! Command-line interface for publishing to and querying a running
//! metricscache API server.
//!
//! # Usage
//!
//! ```bash
//! metricscache --help
//! metricscache health
//! metricscache publish --component bolt1 --instance i1 --metric exe-count --value 5
//! metricscache query --component bolt1 --last 60 --metric exe-count
//! metricscache query --component bolt1 --start 1700000000 --end 1700000060 --protobuf
//! metricscache purge
//! metricscache dump
//! ```

#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use prost::Message;
use shared::models::{MetricCacheRequest, MetricSample};
use shared::wire::{conversions, MetricResponse, CONTENT_TYPE_PROTOBUF};
use std::io::Read;

/// Metricscache CLI - publish and query time-bucketed metrics
#[derive(Parser)]
#[command(name = "metricscache")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API server URL
    #[arg(
        short,
        long,
        env = "METRICSCACHE_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API server health
    Health,
    /// Publish one metric value
    Publish(PublishArgs),
    /// Query a component's buckets
    Query(QueryArgs),
    /// Evict buckets older than the retention window
    Purge,
    /// Print the cache contents
    Dump,
}

#[derive(Args)]
struct PublishArgs {
    /// Component the instance belongs to
    #[arg(long)]
    component: String,
    /// Reporting instance
    #[arg(long)]
    instance: String,
    /// Metric name
    #[arg(long)]
    metric: String,
    /// Measured value
    #[arg(long, allow_negative_numbers = true)]
    value: f64,
    /// Observation time in epoch seconds (default: now)
    #[arg(long)]
    timestamp: Option<i64>,
    /// Send as protobuf instead of JSON
    #[arg(long)]
    protobuf: bool,
}

#[derive(Args)]
struct QueryArgs {
    /// Component to query
    #[arg(long)]
    component: String,
    /// Relative window: the last N seconds
    #[arg(long, conflicts_with_all = ["start", "end"])]
    last: Option<i64>,
    /// Explicit window start in epoch seconds
    #[arg(long, requires = "end")]
    start: Option<i64>,
    /// Explicit window end in epoch seconds
    #[arg(long, requires = "start")]
    end: Option<i64>,
    /// Restrict to an instance (repeatable)
    #[arg(long = "instance")]
    instances: Vec<String>,
    /// Restrict to a metric (repeatable)
    #[arg(long = "metric")]
    metrics: Vec<String>,
    /// Query with the protobuf shape instead of JSON
    #[arg(long)]
    protobuf: bool,
}

impl QueryArgs {
    fn to_request(&self) -> Result<MetricCacheRequest> {
        let mut request = MetricCacheRequest::new(&self.component);
        request = match (self.last, self.start, self.end) {
            (Some(last), None, None) => request.with_relative(last),
            (None, Some(start), Some(end)) => request.with_explicit(start, end),
            _ => bail!("Either --last or both --start and --end are required"),
        };
        for instance in &self.instances {
            request = request.with_instance(instance);
        }
        for metric in &self.metrics {
            request = request.with_metric(metric);
        }
        Ok(request)
    }
}

impl PublishArgs {
    fn to_sample(&self) -> MetricSample {
        let sample = MetricSample::new(&self.component, &self.instance, &self.metric, self.value);
        match self.timestamp {
            Some(timestamp) => sample.with_timestamp(timestamp),
            None => sample,
        }
    }
}

/// Blocking HTTP client for the API server.
struct Client {
    agent: ureq::Agent,
    base_url: String,
}

impl Client {
    fn new(base_url: &str) -> Self {
        Self {
            agent: ureq::Agent::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn read(response: std::result::Result<ureq::Response, ureq::Error>) -> Result<Vec<u8>> {
        match response {
            Ok(response) => {
                let mut body = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut body)
                    .context("Failed to read response body")?;
                Ok(body)
            }
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                bail!("Server returned {code}: {body}")
            }
            Err(e) => Err(e).context("Request failed"),
        }
    }

    fn get(&self, path: &str) -> Result<Vec<u8>> {
        tracing::debug!(path, "GET");
        Self::read(self.agent.get(&self.url(path)).call())
    }

    fn post_json(&self, path: &str, body: &impl serde::Serialize) -> Result<Vec<u8>> {
        tracing::debug!(path, "POST json");
        let body = serde_json::to_string(body)?;
        Self::read(
            self.agent
                .post(&self.url(path))
                .set("Content-Type", "application/json")
                .send_string(&body),
        )
    }

    fn post_protobuf(&self, path: &str, body: &[u8]) -> Result<Vec<u8>> {
        tracing::debug!(path, "POST protobuf");
        Self::read(
            self.agent
                .post(&self.url(path))
                .set("Content-Type", CONTENT_TYPE_PROTOBUF)
                .send_bytes(body),
        )
    }
}

fn print_json(body: &[u8]) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_slice(body).context("Server returned invalid JSON")?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let client = Client::new(&cli.api_url);

    match cli.command {
        Some(Commands::Health) => print_json(&client.get("/health")?),
        Some(Commands::Publish(args)) => {
            let sample = args.to_sample();
            let body = if args.protobuf {
                let publish = conversions::samples_to_publish(std::slice::from_ref(&sample));
                client.post_protobuf("/api/v1/metrics", &publish.encode_to_vec())?
            } else {
                let datum = serde_json::json!({
                    "component_name": sample.component_name,
                    "instance_id": sample.instance_id,
                    "metric_name": sample.metric_name,
                    "value": sample.value,
                    "timestamp": sample.timestamp,
                });
                client.post_json("/api/v1/metrics", &datum)?
            };
            print_json(&body)
        }
        Some(Commands::Query(args)) => {
            let request = args.to_request()?;
            let response = if args.protobuf {
                let wire = conversions::request_to_wire(&request);
                let body = client.post_protobuf("/api/v1/query", &wire.encode_to_vec())?;
                let decoded = MetricResponse::decode(body.as_slice())
                    .context("Server returned an invalid protobuf response")?;
                conversions::response_from_wire(&decoded)
            } else {
                let body = client.post_json("/api/v1/query", &request)?;
                serde_json::from_slice(&body).context("Server returned an invalid response")?
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Some(Commands::Purge) => print_json(&client.post_json("/api/v1/purge", &serde_json::json!({}))?),
        Some(Commands::Dump) => {
            let body = client.get("/api/v1/dump")?;
            println!("{}", String::from_utf8_lossy(&body));
            Ok(())
        }
        None => {
            println!("Metricscache CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
