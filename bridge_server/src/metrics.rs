//! Prometheus metrics for bridge observability.

use metrics::counter;

/// Initialize metrics exporter (Prometheus).
pub fn init_metrics() {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record an inbound event record.
pub fn record_received(event_type: &str) {
    counter!("bridge_records_received_total", "event" => event_type.to_string()).increment(1);
}

/// Record a pipeline cloned from master.
pub fn pipeline_cloned() {
    counter!("bridge_pipelines_cloned_total").increment(1);
}

/// Record a lifecycle action issued against the pipeline service.
pub fn lifecycle_action(action: &str) {
    counter!("bridge_lifecycle_actions_total", "action" => action.to_string()).increment(1);
}

/// Record a commit status posted to the source-control API.
pub fn status_reported(outcome: &str) {
    counter!("bridge_status_reports_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a published status badge.
pub fn badge_published(outcome: &str) {
    counter!("bridge_badges_published_total", "outcome" => outcome.to_string()).increment(1);
}
