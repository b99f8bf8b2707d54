//! Bridge configuration — loaded from environment variables at startup.

#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Master pipeline name; per-PR pipeline names derive from it.
    pub pipeline_name: String,
    /// Branch whose pushes run the master pipeline and own the badge.
    pub default_branch: String,
    /// Context label attached to every posted commit status.
    pub status_context: String,
    /// Source-control API token, also injected into cloned pipelines.
    pub github_token: String,
    /// Public bucket status badges are written to.
    pub status_bucket: String,
    /// Region used when building console links.
    pub region: String,
    /// Console base URL for human-facing build links.
    pub console_url: String,
    /// Pipeline service API base URL.
    pub pipeline_api_url: String,
    /// Object storage base URL.
    pub storage_url: String,
}

impl BridgeConfig {
    /// Load configuration from the environment.
    ///
    /// A missing required value is a startup-time fatal condition, never a
    /// per-event error.
    pub fn from_env() -> anyhow::Result<Self> {
        let pipeline_name = require("BRIDGE_PIPELINE_NAME")?;
        let github_token = require("BRIDGE_GITHUB_TOKEN")?;
        let status_bucket = require("BRIDGE_STATUS_BUCKET")?;

        let default_branch =
            std::env::var("BRIDGE_DEFAULT_BRANCH").unwrap_or_else(|_| "master".to_string());
        let status_context = std::env::var("BRIDGE_STATUS_CONTEXT")
            .unwrap_or_else(|_| "continuous-integration/bridge".to_string());
        let region = std::env::var("BRIDGE_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let console_url = std::env::var("BRIDGE_CONSOLE_URL")
            .unwrap_or_else(|_| "https://console.aws.amazon.com/codebuild/home".to_string());
        let pipeline_api_url = std::env::var("BRIDGE_PIPELINE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8081".to_string());
        let storage_url =
            std::env::var("BRIDGE_STORAGE_URL").unwrap_or_else(|_| "http://localhost:9000".to_string());

        Ok(Self {
            pipeline_name,
            default_branch,
            status_context,
            github_token,
            status_bucket,
            region,
            console_url,
            pipeline_api_url,
            storage_url,
        })
    }
}

fn require(name: &str) -> anyhow::Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!("{name} must be set"),
    }
}
