//! GitHub integration — commit status updates.

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::models::status::StatusReport;

/// Source-control status API.
///
/// Posting is at-least-once; the API is last-write-wins per `(sha, context)`,
/// so duplicate posts are safe.
#[async_trait]
pub trait StatusApi: Send + Sync {
    async fn create_status(&self, report: &StatusReport) -> Result<(), BridgeError>;
}

/// GitHub commit status client.
pub struct GithubStatusApi {
    client: reqwest::Client,
    token: String,
}

impl GithubStatusApi {
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl StatusApi for GithubStatusApi {
    async fn create_status(&self, report: &StatusReport) -> Result<(), BridgeError> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/statuses/{}",
            report.owner, report.repo, report.sha
        );
        let body = serde_json::json!({
            "state": report.outcome.as_str(),
            "description": report.description,
            "target_url": report.target_url,
            "context": report.context,
        });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "ci-bridge")
            .json(&body)
            .send()
            .await
            .map_err(|e| BridgeError::StatusReportFailed {
                sha: report.sha.clone(),
                source: e.into(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BridgeError::StatusReportFailed {
                sha: report.sha.clone(),
                source: anyhow::anyhow!("GitHub returned {status}: {text}"),
            });
        }

        tracing::info!(
            sha = %report.sha,
            state = report.outcome.as_str(),
            context = %report.context,
            "Commit status posted"
        );
        Ok(())
    }
}
