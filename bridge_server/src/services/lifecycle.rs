//! Pipeline lifecycle control — starts or tears down executions per event.

use crate::error::BridgeError;
use crate::models::event::SourceEvent;
use crate::services::naming;
use crate::services::pipeline_service::PipelineService;

/// Side effect the controller applies to a resolved pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Start,
    Delete,
}

impl LifecycleAction {
    pub fn verb(self) -> &'static str {
        match self {
            LifecycleAction::Start => "start",
            LifecycleAction::Delete => "delete",
        }
    }
}

/// Decide the desired action for a source event, if any.
///
/// Closed pull requests tear their cloned pipeline down; every other pull
/// request state starts an execution. Pushes start the master pipeline on
/// the default branch only.
pub fn decide(event: &SourceEvent, default_branch: &str) -> Option<LifecycleAction> {
    match event {
        SourceEvent::PullRequest(pr) if pr.pull_request.state == "closed" => {
            Some(LifecycleAction::Delete)
        }
        SourceEvent::PullRequest(_) => Some(LifecycleAction::Start),
        SourceEvent::Push(push) if naming::is_default_branch(&push.git_ref, default_branch) => {
            Some(LifecycleAction::Start)
        }
        SourceEvent::Push(_) => None,
    }
}

/// Apply an action. Fire-and-forget: execution completion is never polled.
pub async fn apply(
    pipelines: &dyn PipelineService,
    action: LifecycleAction,
    name: &str,
) -> Result<(), BridgeError> {
    let result = match action {
        LifecycleAction::Start => pipelines.start_execution(name).await,
        LifecycleAction::Delete => pipelines.delete_pipeline(name).await,
    };

    result.map_err(|e| BridgeError::LifecycleActionFailed {
        action: action.verb(),
        name: name.to_string(),
        source: anyhow::Error::new(e),
    })?;

    crate::metrics::lifecycle_action(action.verb());
    tracing::info!(pipeline = name, action = action.verb(), "Lifecycle action applied");
    Ok(())
}
