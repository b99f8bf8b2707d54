//! Pipeline name resolution — deterministic per-branch/PR naming.

use crate::models::event::SourceEvent;

/// Replace every non-word character with `-` so derived pipeline names stay
/// valid and collision-free for distinct qualifiers.
pub fn sanitize(qualifier: &str) -> String {
    qualifier
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
        .collect()
}

/// Whether a push ref targets the default branch, either as a bare name or a
/// `refs/heads/<default>` style ref.
pub fn is_default_branch(git_ref: &str, default_branch: &str) -> bool {
    git_ref == default_branch || git_ref.ends_with(&format!("/{default_branch}"))
}

/// Resolve the concrete pipeline name for a source event.
///
/// Pushes resolve to the master pipeline on the default branch only; other
/// pushes are not actionable. Pull requests always resolve to
/// `<master>.pr-<number>`, the per-PR clone name.
pub fn resolve(master: &str, default_branch: &str, event: &SourceEvent) -> Option<String> {
    match event {
        SourceEvent::Push(push) => {
            is_default_branch(&push.git_ref, default_branch).then(|| master.to_string())
        }
        SourceEvent::PullRequest(pr) => {
            Some(format!("{master}.{}", sanitize(&format!("pr-{}", pr.number))))
        }
    }
}
