//! Status badges — outcome selection and publication to public storage.

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::models::status::{Badge, Outcome};
use crate::services::storage_service::ObjectStore;

/// Intermediate caches must never serve a stale badge.
const CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// Badge for a normalized outcome. Pending has no badge.
pub fn badge_for(outcome: Outcome) -> Option<Badge> {
    match outcome {
        Outcome::Success => Some(Badge::Passing),
        Outcome::Failure => Some(Badge::Failing),
        Outcome::Error => Some(Badge::Errored),
        Outcome::Pending => None,
    }
}

/// Publish the badge for `outcome` under `<repo>/status.svg`.
///
/// Publishes only when the branch is the default branch and the outcome has
/// a badge; anything else is a silent no-op, not an error.
pub async fn publish(
    store: &dyn ObjectStore,
    config: &BridgeConfig,
    repo: &str,
    branch: &str,
    outcome: Outcome,
) -> Result<(), BridgeError> {
    let badge = match badge_for(outcome) {
        Some(badge) if branch == config.default_branch => badge,
        _ => return Ok(()),
    };

    let key = format!("{repo}/status.svg");
    store
        .put_object(
            &config.status_bucket,
            &key,
            badge.bytes(),
            Badge::content_type(),
            CACHE_CONTROL,
        )
        .await
        .map_err(|e| BridgeError::BadgePublishFailed {
            key: key.clone(),
            source: e,
        })?;

    crate::metrics::badge_published(outcome.as_str());
    tracing::info!(key = %key, outcome = outcome.as_str(), "Badge published");
    Ok(())
}
