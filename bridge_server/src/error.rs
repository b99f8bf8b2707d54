//! Bridge error taxonomy.
//!
//! No internal retries anywhere: every failure propagates to the top-level
//! completion result, and the invoking platform's redelivery semantics take
//! over from there.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed or unrecognized event record; aborts the batch.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// The configured master pipeline does not exist. Fatal misconfiguration.
    #[error("master pipeline {0} does not exist")]
    MasterPipelineMissing(String),

    /// Pipeline creation failed for a reason other than "already exists".
    #[error("pipeline creation failed for {name}")]
    PipelineCreationFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A start-execution or delete call against the pipeline service failed.
    #[error("{action} failed for pipeline {name}")]
    LifecycleActionFailed {
        action: &'static str,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Posting to the source-control status API failed.
    #[error("status report failed for {sha}")]
    StatusReportFailed {
        sha: String,
        #[source]
        source: anyhow::Error,
    },

    /// The storage write for a badge failed. The status report that preceded
    /// it is not undone.
    #[error("badge publish failed for {key}")]
    BadgePublishFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}
