//! Event envelope handling — the sequential per-record orchestration fold.
//!
//! Records run strictly in arrival order so a pull request's "closed" event
//! cannot overtake its own "open" events within a batch. Each record's chain
//! (resolve → clone → act → report → badge) settles fully before the next
//! record starts; the first error terminates the batch.

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::models::event::{
    BuildPhaseEvent, Envelope, EventRecord, PipelineStateEvent, PullRequestEvent, PushEvent,
    SourceEvent,
};
use crate::services::lifecycle::LifecycleAction;
use crate::services::pipeline_service::PipelineService;
use crate::services::storage_service::ObjectStore;
use crate::services::github_service::StatusApi;
use crate::services::{badge, cloner, lifecycle, naming, reporter, status_map};

/// The bridge: configuration plus explicitly constructed clients for the
/// external collaborators. Holds no other state between invocations.
pub struct Bridge {
    pub config: BridgeConfig,
    pub pipelines: Arc<dyn PipelineService>,
    pub status_api: Arc<dyn StatusApi>,
    pub store: Arc<dyn ObjectStore>,
}

impl Bridge {
    /// Process one envelope. Returns an opaque summary on full success or
    /// the first encountered error; no partial-success reporting per record.
    pub async fn handle(&self, envelope: &Envelope) -> Result<serde_json::Value, BridgeError> {
        let mut processed = 0usize;
        for record in &envelope.records {
            self.handle_record(record).await?;
            processed += 1;
        }
        Ok(serde_json::json!({ "processed": processed }))
    }

    async fn handle_record(&self, record: &EventRecord) -> Result<(), BridgeError> {
        crate::metrics::record_received(&record.event);

        match record.event.as_str() {
            "push" => {
                let event: PushEvent = parse(&record.payload)?;
                self.handle_source_event(SourceEvent::Push(event)).await
            }
            "pull_request" => {
                let event: PullRequestEvent = parse(&record.payload)?;
                self.handle_source_event(SourceEvent::PullRequest(event)).await
            }
            "build_phase" => {
                let event: BuildPhaseEvent = parse(&record.payload)?;
                self.handle_build_phase(event).await
            }
            "pipeline_state" => {
                let event: PipelineStateEvent = parse(&record.payload)?;
                self.handle_pipeline_state(event).await
            }
            other => Err(BridgeError::InvalidEvent(format!(
                "unknown event type: {other}"
            ))),
        }
    }

    /// Push / pull-request flow: resolve → clone (PR only) → act → report.
    async fn handle_source_event(&self, event: SourceEvent) -> Result<(), BridgeError> {
        let target =
            match naming::resolve(&self.config.pipeline_name, &self.config.default_branch, &event)
            {
                Some(name) => name,
                None => {
                    tracing::debug!(
                        branch = event.branch(),
                        "Push outside the default branch, ignoring"
                    );
                    return Ok(());
                }
            };

        // Pull requests run on a per-PR clone of the master pipeline.
        if let SourceEvent::PullRequest(ref pr) = event {
            cloner::ensure_pipeline(
                self.pipelines.as_ref(),
                &self.config.pipeline_name,
                &target,
                cloner::CloneOverrides {
                    branch: &pr.pull_request.head.branch,
                    oauth_token: &self.config.github_token,
                },
            )
            .await?;
        }

        let action = match lifecycle::decide(&event, &self.config.default_branch) {
            Some(action) => action,
            None => return Ok(()),
        };

        lifecycle::apply(self.pipelines.as_ref(), action, &target).await?;

        // Deletions get no status; there is no new commit to report against.
        if action == LifecycleAction::Start {
            reporter::report_pending(self.status_api.as_ref(), &self.config, &event).await?;
        }
        Ok(())
    }

    /// Build-phase flow: filter → map → report → badge.
    async fn handle_build_phase(&self, event: BuildPhaseEvent) -> Result<(), BridgeError> {
        // Shared event routing can deliver another project's build events
        // here; only act on builds for our own pipeline family.
        if !event.project().starts_with(&self.config.pipeline_name) {
            tracing::debug!(build_id = %event.build_id, "Build event for a foreign project, ignoring");
            return Ok(());
        }

        let (outcome, description) = match status_map::map_phase(&event) {
            Some(mapped) => mapped,
            // Intermediate phases stay silent: no status call, no storage call.
            None => return Ok(()),
        };

        let report =
            reporter::report_phase(self.status_api.as_ref(), &self.config, &event, outcome, description)
                .await?;

        let branch = event.branch_ref().unwrap_or_default();
        badge::publish(self.store.as_ref(), &self.config, &report.repo, branch, outcome).await
    }

    /// Pipeline execution state flow: filter → map → resolve SHA → report.
    async fn handle_pipeline_state(&self, event: PipelineStateEvent) -> Result<(), BridgeError> {
        if !event.pipeline.starts_with(&self.config.pipeline_name) {
            tracing::debug!(pipeline = %event.pipeline, "State event for a foreign pipeline, ignoring");
            return Ok(());
        }

        let (outcome, description) = match status_map::map_execution_state(&event.state) {
            Some(mapped) => mapped,
            None => return Ok(()),
        };

        let definition = self
            .pipelines
            .get_pipeline(&event.pipeline)
            .await
            .map_err(|e| report_resolution_failed(&event, e))?
            .ok_or_else(|| {
                BridgeError::InvalidEvent(format!("unknown pipeline: {}", event.pipeline))
            })?;

        let (owner, repo) = definition.source_owner_repo().ok_or_else(|| {
            BridgeError::InvalidEvent(format!(
                "pipeline {} has no source configuration",
                definition.name
            ))
        })?;

        let execution = self
            .pipelines
            .get_execution(&event.pipeline, &event.execution_id)
            .await
            .map_err(|e| report_resolution_failed(&event, e))?;
        let sha = execution
            .artifact_revisions
            .get(0)
            .map(|revision| revision.revision_id.clone())
            .ok_or_else(|| {
                BridgeError::InvalidEvent(format!(
                    "execution {} has no artifact revisions",
                    event.execution_id
                ))
            })?;

        reporter::report_execution(
            self.status_api.as_ref(),
            &self.config,
            &owner,
            &repo,
            &sha,
            outcome,
            description,
        )
        .await
    }
}

fn parse<T: serde::de::DeserializeOwned>(payload: &str) -> Result<T, BridgeError> {
    serde_json::from_str(payload).map_err(|e| BridgeError::InvalidEvent(e.to_string()))
}

/// The SHA to report against could not be resolved from the pipeline service.
fn report_resolution_failed(
    event: &PipelineStateEvent,
    source: impl Into<anyhow::Error>,
) -> BridgeError {
    BridgeError::StatusReportFailed {
        sha: format!("{}:{}", event.pipeline, event.execution_id),
        source: source.into(),
    }
}
