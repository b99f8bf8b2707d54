//! Normalized build outcomes, status reports, and badge assets.

use serde::{Deserialize, Serialize};

/// Normalized outcome posted to the source-control status API.
///
/// Computed fresh per event and never persisted; the status API is the
/// source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pending,
    Success,
    Failure,
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Error => "error",
        }
    }
}

/// The unit posted to the status API. Posting the same report twice is safe:
/// the API is last-write-wins per `(sha, context)`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub owner: String,
    pub repo: String,
    pub sha: String,
    pub outcome: Outcome,
    pub description: String,
    pub target_url: Option<String>,
    pub context: String,
}

/// Status badge assets served from public storage. Pending has no badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Passing,
    Failing,
    Errored,
}

impl Badge {
    pub fn bytes(self) -> &'static [u8] {
        match self {
            Badge::Passing => include_bytes!("../../assets/passing.svg"),
            Badge::Failing => include_bytes!("../../assets/failing.svg"),
            Badge::Errored => include_bytes!("../../assets/errored.svg"),
        }
    }

    pub fn content_type() -> &'static str {
        "image/svg+xml"
    }
}
