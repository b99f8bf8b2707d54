//! Pipeline cloning — ensures a per-PR pipeline exists.
//!
//! Two concurrent invocations can both observe "no existing pipeline" and
//! race the creation; the loser re-fetches and returns the winner's
//! definition instead of failing.

use crate::error::BridgeError;
use crate::models::pipeline::PipelineDefinition;
use crate::services::pipeline_service::{PipelineService, PipelineServiceError};

/// Fields patched into the cloned source-checkout action.
#[derive(Debug, Clone, Copy)]
pub struct CloneOverrides<'a> {
    pub branch: &'a str,
    pub oauth_token: &'a str,
}

/// Ensure a pipeline named `target` exists, cloning `master` if necessary.
///
/// Callers observe at most one logical pipeline per target name even under
/// concurrent invocations.
pub async fn ensure_pipeline(
    pipelines: &dyn PipelineService,
    master: &str,
    target: &str,
    overrides: CloneOverrides<'_>,
) -> Result<PipelineDefinition, BridgeError> {
    if let Some(existing) = pipelines
        .get_pipeline(target)
        .await
        .map_err(|e| creation_failed(target, e))?
    {
        tracing::debug!(pipeline = target, "Reusing existing pipeline");
        return Ok(existing);
    }

    let master_def = pipelines
        .get_pipeline(master)
        .await
        .map_err(|e| creation_failed(master, e))?
        .ok_or_else(|| BridgeError::MasterPipelineMissing(master.to_string()))?;

    let clone = master_def.clone_for(target, overrides.branch, overrides.oauth_token);

    match pipelines.create_pipeline(&clone).await {
        Ok(created) => {
            tracing::info!(
                pipeline = target,
                branch = overrides.branch,
                "Pipeline cloned from master"
            );
            crate::metrics::pipeline_cloned();
            Ok(created)
        }
        Err(PipelineServiceError::AlreadyExists(_)) => {
            // Lost the creation race; the winner's definition is authoritative.
            match pipelines.get_pipeline(target).await {
                Ok(Some(existing)) => Ok(existing),
                Ok(None) => Err(creation_failed(
                    target,
                    anyhow::anyhow!("pipeline vanished after losing the creation race"),
                )),
                Err(e) => Err(creation_failed(target, e)),
            }
        }
        Err(e) => Err(creation_failed(target, e)),
    }
}

fn creation_failed(name: &str, source: impl Into<anyhow::Error>) -> BridgeError {
    BridgeError::PipelineCreationFailed {
        name: name.to_string(),
        source: source.into(),
    }
}
