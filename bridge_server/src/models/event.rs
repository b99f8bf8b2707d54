//! Inbound event payloads — source-control webhooks and build lifecycle
//! events, delivered as a batch envelope of JSON-encoded records.

use serde::Deserialize;

/// Batch envelope delivered by the event transport.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub records: Vec<EventRecord>,
}

/// One record: an event-type discriminator plus a JSON-encoded payload.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub event: String,
    pub payload: String,
}

/// Source-control events the bridge acts on. Exactly one kind per record.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    Push(PushEvent),
    PullRequest(PullRequestEvent),
}

impl SourceEvent {
    /// Commit SHA the event points at: PR head SHA, or push `after` SHA.
    pub fn sha(&self) -> &str {
        match self {
            SourceEvent::Push(push) => &push.after,
            SourceEvent::PullRequest(pr) => &pr.pull_request.head.sha,
        }
    }

    /// Branch name, with any `refs/heads/` prefix stripped.
    pub fn branch(&self) -> &str {
        match self {
            SourceEvent::Push(push) => push
                .git_ref
                .strip_prefix("refs/heads/")
                .unwrap_or(&push.git_ref),
            SourceEvent::PullRequest(pr) => &pr.pull_request.head.branch,
        }
    }

    pub fn repository(&self) -> &Repository {
        match self {
            SourceEvent::Push(push) => &push.repository,
            SourceEvent::PullRequest(pr) => &pr.repository,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub after: String,
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub number: u64,
    pub pull_request: PullRequest,
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    /// "open", "closed", or any other state GitHub reports.
    pub state: String,
    pub head: PullRequestHead,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestHead {
    #[serde(rename = "ref")]
    pub branch: String,
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: RepositoryOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// Build-phase lifecycle event emitted by the build service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildPhaseEvent {
    pub build_id: String,
    pub completed_phase: String,
    pub completed_phase_status: String,
    pub additional_information: AdditionalInformation,
}

impl BuildPhaseEvent {
    /// Project portion of the build id (`.../<project>:<run>`).
    pub fn project(&self) -> &str {
        let tail = self.build_id.rsplit('/').next().unwrap_or(&self.build_id);
        tail.split(':').next().unwrap_or(tail)
    }

    /// Run id, the last `:`-segment of the build id.
    pub fn run_id(&self) -> &str {
        self.build_id.rsplit(':').next().unwrap_or(&self.build_id)
    }

    /// Branch ref carried in the first build environment variable.
    pub fn branch_ref(&self) -> Option<&str> {
        self.additional_information
            .environment
            .environment_variables
            .get(0)
            .map(|var| var.value.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdditionalInformation {
    /// Commit SHA the build was started for.
    pub source_version: String,
    pub source: SourceLocation,
    pub environment: BuildEnvironment,
    /// All phases reported so far, in order.
    #[serde(default)]
    pub phases: Vec<PhaseEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceLocation {
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildEnvironment {
    #[serde(default)]
    pub environment_variables: Vec<EnvironmentVariable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PhaseEntry {
    pub phase_type: String,
    /// Absent while a phase is still in flight.
    pub phase_status: Option<String>,
}

/// Pipeline-level execution state change event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineStateEvent {
    pub pipeline: String,
    pub execution_id: String,
    pub state: String,
}
