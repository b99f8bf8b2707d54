//! CI bridge entry point — reads one event envelope, processes it, exits
//! with the batch result.

use std::sync::Arc;

use clap::Parser;
use tokio::io::AsyncReadExt;

use ci_bridge::config::BridgeConfig;
use ci_bridge::handler::Bridge;
use ci_bridge::metrics;
use ci_bridge::models::event::Envelope;
use ci_bridge::services::github_service::GithubStatusApi;
use ci_bridge::services::pipeline_service::HttpPipelineService;
use ci_bridge::services::storage_service::HttpObjectStore;

#[derive(Parser)]
#[command(name = "ci-bridge", about = "CI orchestration bridge")]
struct Cli {
    /// Path to the event envelope JSON; stdin when omitted.
    #[arg(short, long, env = "BRIDGE_EVENT_FILE")]
    input: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    }

    let cli = Cli::parse();
    let config = BridgeConfig::from_env()?;

    metrics::init_metrics();

    let raw = match &cli.input {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    let envelope: Envelope = serde_json::from_str(&raw)?;

    let pipelines = Arc::new(HttpPipelineService::new(&config.pipeline_api_url));
    let status_api = Arc::new(GithubStatusApi::new(&config.github_token));
    let store = Arc::new(HttpObjectStore::new(&config.storage_url));

    let bridge = Bridge {
        config,
        pipelines,
        status_api,
        store,
    };

    tracing::info!(records = envelope.records.len(), "Processing event envelope");
    let result = bridge.handle(&envelope).await?;
    println!("{result}");
    Ok(())
}
