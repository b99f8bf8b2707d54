//! Execution status reporting — resolves commit SHAs and posts normalized
//! status reports to the source-control API.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::models::event::{BuildPhaseEvent, SourceEvent};
use crate::models::status::{Outcome, StatusReport};
use crate::services::github_service::StatusApi;

static SOURCE_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com[/:]([^/]+)/([^/.]+)").unwrap());

/// Extract `(owner, repo)` from a source location URL of the form
/// `.../<owner>/<repo>[.git]`.
pub fn parse_source_location(location: &str) -> Option<(String, String)> {
    let caps = SOURCE_LOCATION.captures(location)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Post the initial pending status after a successful execution start.
pub async fn report_pending(
    status_api: &dyn StatusApi,
    config: &BridgeConfig,
    event: &SourceEvent,
) -> Result<(), BridgeError> {
    let repository = event.repository();
    let report = StatusReport {
        owner: repository.owner.login.clone(),
        repo: repository.name.clone(),
        sha: event.sha().to_string(),
        outcome: Outcome::Pending,
        description: "Waiting for status to be reported".to_string(),
        target_url: None,
        context: config.status_context.clone(),
    };
    submit(status_api, &report).await
}

/// Post the mapped status for a completed build phase.
///
/// The commit SHA comes from the build's source version; owner and repo are
/// parsed from the embedded source location URL.
pub async fn report_phase(
    status_api: &dyn StatusApi,
    config: &BridgeConfig,
    event: &BuildPhaseEvent,
    outcome: Outcome,
    description: &str,
) -> Result<StatusReport, BridgeError> {
    let location = &event.additional_information.source.location;
    let (owner, repo) = parse_source_location(location).ok_or_else(|| {
        BridgeError::InvalidEvent(format!("no owner/repo in source location {location}"))
    })?;

    let report = StatusReport {
        owner,
        sha: event.additional_information.source_version.clone(),
        outcome,
        description: description.to_string(),
        target_url: Some(console_url(config, &repo, event.run_id())),
        context: config.status_context.clone(),
        repo,
    };
    submit(status_api, &report).await?;
    Ok(report)
}

/// Post a status for a pipeline execution state change. Owner, repo, and SHA
/// are resolved by the caller from the pipeline definition and execution.
pub async fn report_execution(
    status_api: &dyn StatusApi,
    config: &BridgeConfig,
    owner: &str,
    repo: &str,
    sha: &str,
    outcome: Outcome,
    description: &str,
) -> Result<(), BridgeError> {
    let report = StatusReport {
        owner: owner.to_string(),
        repo: repo.to_string(),
        sha: sha.to_string(),
        outcome,
        description: description.to_string(),
        target_url: None,
        context: config.status_context.clone(),
    };
    submit(status_api, &report).await
}

async fn submit(status_api: &dyn StatusApi, report: &StatusReport) -> Result<(), BridgeError> {
    status_api.create_status(report).await?;
    crate::metrics::status_reported(report.outcome.as_str());
    Ok(())
}

/// Human-facing console link for a build run.
fn console_url(config: &BridgeConfig, repo: &str, run_id: &str) -> String {
    format!(
        "{}?region={}#/builds/{repo}:{run_id}/view/new",
        config.console_url, config.region
    )
}
