//! Pipeline definitions — transient copies fetched from the pipeline service.
//!
//! The bridge never caches these across invocations; a definition is fetched,
//! possibly patched into a clone, and either submitted for creation or
//! dropped.

use serde::{Deserialize, Serialize};

/// A named, ordered sequence of stages owned by the pipeline service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub name: String,
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub configuration: ActionConfiguration,
}

/// Configuration of a pipeline action. Only the source-checkout action (the
/// first action of the first stage) carries the branch/repo fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o_auth_token: Option<String>,
}

impl PipelineDefinition {
    /// The source-checkout action: first action of the first stage.
    pub fn source_action(&self) -> Option<&Action> {
        self.stages.get(0).and_then(|stage| stage.actions.get(0))
    }

    /// Owner and repo from the source-checkout action configuration.
    pub fn source_owner_repo(&self) -> Option<(String, String)> {
        let config = &self.source_action()?.configuration;
        match (&config.owner, &config.repo) {
            (Some(owner), Some(repo)) => Some((owner.clone(), repo.clone())),
            _ => None,
        }
    }

    /// Produce a clone named `target` with the source-checkout action patched
    /// to track `branch` using `oauth_token`.
    ///
    /// This is copy-then-patch: `self` stays untouched, so the fetched master
    /// definition can be reused across retries.
    pub fn clone_for(&self, target: &str, branch: &str, oauth_token: &str) -> PipelineDefinition {
        let mut clone = self.clone();
        clone.name = target.to_string();
        if let Some(action) = clone
            .stages
            .get_mut(0)
            .and_then(|stage| stage.actions.get_mut(0))
        {
            action.configuration.branch = Some(branch.to_string());
            action.configuration.o_auth_token = Some(oauth_token.to_string());
        }
        clone
    }
}

/// One pipeline execution, as returned by the pipeline service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    #[serde(default)]
    pub artifact_revisions: Vec<ArtifactRevision>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRevision {
    pub revision_id: String,
}
