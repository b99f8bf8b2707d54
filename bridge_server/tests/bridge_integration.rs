//! Integration tests for the bridge event handler with in-memory fakes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ci_bridge::config::BridgeConfig;
use ci_bridge::error::BridgeError;
use ci_bridge::handler::Bridge;
use ci_bridge::models::event::{Envelope, EventRecord};
use ci_bridge::models::pipeline::{
    Action, ActionConfiguration, ArtifactRevision, Execution, PipelineDefinition, Stage,
};
use ci_bridge::models::status::{Outcome, StatusReport};
use ci_bridge::services::github_service::StatusApi;
use ci_bridge::services::pipeline_service::{PipelineService, PipelineServiceError};
use ci_bridge::services::storage_service::ObjectStore;

// ── Fakes ──

#[derive(Default)]
struct FakePipelines {
    pipelines: Mutex<HashMap<String, PipelineDefinition>>,
    executions: Mutex<HashMap<(String, String), Execution>>,
    created: Mutex<Vec<String>>,
    started: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl PipelineService for FakePipelines {
    async fn get_pipeline(
        &self,
        name: &str,
    ) -> Result<Option<PipelineDefinition>, PipelineServiceError> {
        Ok(self.pipelines.lock().unwrap().get(name).cloned())
    }

    async fn create_pipeline(
        &self,
        definition: &PipelineDefinition,
    ) -> Result<PipelineDefinition, PipelineServiceError> {
        let mut map = self.pipelines.lock().unwrap();
        if map.contains_key(&definition.name) {
            return Err(PipelineServiceError::AlreadyExists(definition.name.clone()));
        }
        map.insert(definition.name.clone(), definition.clone());
        self.created.lock().unwrap().push(definition.name.clone());
        Ok(definition.clone())
    }

    async fn start_execution(&self, name: &str) -> Result<(), PipelineServiceError> {
        self.started.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn delete_pipeline(&self, name: &str) -> Result<(), PipelineServiceError> {
        self.deleted.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn get_execution(
        &self,
        pipeline: &str,
        execution_id: &str,
    ) -> Result<Execution, PipelineServiceError> {
        self.executions
            .lock()
            .unwrap()
            .get(&(pipeline.to_string(), execution_id.to_string()))
            .cloned()
            .ok_or_else(|| PipelineServiceError::Other(anyhow::anyhow!("no such execution")))
    }
}

#[derive(Default)]
struct FakeStatusApi {
    reports: Mutex<Vec<StatusReport>>,
}

#[async_trait]
impl StatusApi for FakeStatusApi {
    async fn create_status(&self, report: &StatusReport) -> Result<(), BridgeError> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Put {
    bucket: String,
    key: String,
    content_type: String,
    cache_control: String,
    body_len: usize,
}

#[derive(Default)]
struct FakeStore {
    puts: Mutex<Vec<Put>>,
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
        cache_control: &str,
    ) -> anyhow::Result<()> {
        self.puts.lock().unwrap().push(Put {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            cache_control: cache_control.to_string(),
            body_len: body.len(),
        });
        Ok(())
    }
}

// ── Harness ──

struct Harness {
    bridge: Bridge,
    pipelines: Arc<FakePipelines>,
    status_api: Arc<FakeStatusApi>,
    store: Arc<FakeStore>,
}

fn config() -> BridgeConfig {
    BridgeConfig {
        pipeline_name: "widget".to_string(),
        default_branch: "master".to_string(),
        status_context: "continuous-integration/bridge".to_string(),
        github_token: "tok".to_string(),
        status_bucket: "badges".to_string(),
        region: "us-east-1".to_string(),
        console_url: "https://console.aws.amazon.com/codebuild/home".to_string(),
        pipeline_api_url: "http://localhost:8081".to_string(),
        storage_url: "http://localhost:9000".to_string(),
    }
}

fn master_definition() -> PipelineDefinition {
    PipelineDefinition {
        name: "widget".to_string(),
        stages: vec![Stage {
            name: "Source".to_string(),
            actions: vec![Action {
                name: "Checkout".to_string(),
                configuration: ActionConfiguration {
                    branch: Some("master".to_string()),
                    owner: Some("acme".to_string()),
                    repo: Some("widget".to_string()),
                    o_auth_token: None,
                },
            }],
        }],
    }
}

fn harness_with(definitions: &[PipelineDefinition]) -> Harness {
    let pipelines = Arc::new(FakePipelines::default());
    {
        let mut map = pipelines.pipelines.lock().unwrap();
        for definition in definitions {
            map.insert(definition.name.clone(), definition.clone());
        }
    }
    let status_api = Arc::new(FakeStatusApi::default());
    let store = Arc::new(FakeStore::default());

    let bridge = Bridge {
        config: config(),
        pipelines: pipelines.clone(),
        status_api: status_api.clone(),
        store: store.clone(),
    };

    Harness {
        bridge,
        pipelines,
        status_api,
        store,
    }
}

fn envelope(records: Vec<(&str, serde_json::Value)>) -> Envelope {
    Envelope {
        records: records
            .into_iter()
            .map(|(event, payload)| EventRecord {
                event: event.to_string(),
                payload: payload.to_string(),
            })
            .collect(),
    }
}

fn push_payload(git_ref: &str, after: &str) -> serde_json::Value {
    serde_json::json!({
        "ref": git_ref,
        "after": after,
        "repository": { "name": "widget", "owner": { "login": "acme" } }
    })
}

fn pull_request_payload(number: u64, state: &str, branch: &str, sha: &str) -> serde_json::Value {
    serde_json::json!({
        "number": number,
        "pull_request": {
            "state": state,
            "head": { "ref": branch, "sha": sha }
        },
        "repository": { "name": "widget", "owner": { "login": "acme" } }
    })
}

fn build_phase_payload(
    project: &str,
    phase: &str,
    status: &str,
    branch: &str,
    phases: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "build-id": format!("arn:aws:codebuild:us-east-1:123456789012:build/{project}:f3a9"),
        "completed-phase": phase,
        "completed-phase-status": status,
        "additional-information": {
            "source-version": "deadbeef",
            "source": { "location": "https://github.com/acme/widget.git" },
            "environment": {
                "environment-variables": [
                    { "name": "GIT_BRANCH", "value": branch }
                ]
            },
            "phases": phases
        }
    })
}

// ── Source events ──

#[tokio::test]
async fn push_to_default_branch_starts_master_and_reports_pending() {
    let h = harness_with(&[master_definition()]);

    let result = h
        .bridge
        .handle(&envelope(vec![(
            "push",
            push_payload("refs/heads/master", "abc123"),
        )]))
        .await
        .unwrap();
    assert_eq!(result["processed"], 1);

    assert_eq!(*h.pipelines.started.lock().unwrap(), vec!["widget"]);
    assert!(h.pipelines.created.lock().unwrap().is_empty());

    let reports = h.status_api.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, Outcome::Pending);
    assert_eq!(reports[0].description, "Waiting for status to be reported");
    assert_eq!(reports[0].sha, "abc123");
    assert_eq!(reports[0].owner, "acme");
    assert_eq!(reports[0].repo, "widget");
}

#[tokio::test]
async fn push_to_feature_branch_is_a_no_op() {
    let h = harness_with(&[master_definition()]);

    h.bridge
        .handle(&envelope(vec![(
            "push",
            push_payload("refs/heads/feature/x", "abc123"),
        )]))
        .await
        .unwrap();

    assert!(h.pipelines.started.lock().unwrap().is_empty());
    assert!(h.status_api.reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn open_pull_request_clones_master_and_starts() {
    let h = harness_with(&[master_definition()]);

    h.bridge
        .handle(&envelope(vec![(
            "pull_request",
            pull_request_payload(42, "open", "feature/x", "headsha"),
        )]))
        .await
        .unwrap();

    assert_eq!(*h.pipelines.created.lock().unwrap(), vec!["widget.pr-42"]);
    assert_eq!(*h.pipelines.started.lock().unwrap(), vec!["widget.pr-42"]);

    let map = h.pipelines.pipelines.lock().unwrap();
    let clone = map.get("widget.pr-42").unwrap();
    let clone_config = &clone.source_action().unwrap().configuration;
    assert_eq!(clone_config.branch.as_deref(), Some("feature/x"));
    assert_eq!(clone_config.o_auth_token.as_deref(), Some("tok"));
    // Master stays untouched.
    assert_eq!(map.get("widget").unwrap(), &master_definition());

    let reports = h.status_api.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, Outcome::Pending);
    assert_eq!(reports[0].sha, "headsha");
}

#[tokio::test]
async fn closed_pull_request_deletes_without_reporting() {
    let existing = master_definition().clone_for("widget.pr-42", "feature/x", "tok");
    let h = harness_with(&[master_definition(), existing]);

    h.bridge
        .handle(&envelope(vec![(
            "pull_request",
            pull_request_payload(42, "closed", "feature/x", "headsha"),
        )]))
        .await
        .unwrap();

    assert!(h.pipelines.created.lock().unwrap().is_empty());
    assert!(h.pipelines.started.lock().unwrap().is_empty());
    assert_eq!(*h.pipelines.deleted.lock().unwrap(), vec!["widget.pr-42"]);
    assert!(h.status_api.reports.lock().unwrap().is_empty());
}

// ── Build-phase events ──

#[tokio::test]
async fn build_timeout_reports_error_and_publishes_errored_badge() {
    let h = harness_with(&[master_definition()]);

    h.bridge
        .handle(&envelope(vec![(
            "build_phase",
            build_phase_payload("widget", "BUILD", "TIMED_OUT", "master", serde_json::json!([])),
        )]))
        .await
        .unwrap();

    let reports = h.status_api.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, Outcome::Error);
    assert_eq!(reports[0].description, "Build timed out");
    assert_eq!(reports[0].sha, "deadbeef");
    let target_url = reports[0].target_url.as_deref().unwrap();
    assert!(target_url.contains("widget:f3a9"), "{target_url}");
    assert!(target_url.contains("region=us-east-1"), "{target_url}");

    let puts = h.store.puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].bucket, "badges");
    assert_eq!(puts[0].key, "widget/status.svg");
    assert_eq!(puts[0].content_type, "image/svg+xml");
    assert_eq!(puts[0].cache_control, "no-cache, no-store, must-revalidate");
    assert!(puts[0].body_len > 0);
}

#[tokio::test]
async fn finalizing_with_clean_history_reports_success_and_passing_badge() {
    let h = harness_with(&[master_definition()]);
    let phases = serde_json::json!([
        { "phase-type": "SUBMITTED", "phase-status": "SUCCEEDED" },
        { "phase-type": "BUILD", "phase-status": "SUCCEEDED" },
        { "phase-type": "COMPLETED" }
    ]);

    h.bridge
        .handle(&envelope(vec![(
            "build_phase",
            build_phase_payload("widget", "FINALIZING", "SUCCEEDED", "master", phases),
        )]))
        .await
        .unwrap();

    let reports = h.status_api.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, Outcome::Success);
    assert_eq!(reports[0].description, "Build successful");
    assert_eq!(h.store.puts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unmapped_phase_makes_no_external_calls() {
    let h = harness_with(&[master_definition()]);

    h.bridge
        .handle(&envelope(vec![(
            "build_phase",
            build_phase_payload(
                "widget",
                "DOWNLOAD_SOURCE",
                "SUCCEEDED",
                "master",
                serde_json::json!([]),
            ),
        )]))
        .await
        .unwrap();

    assert!(h.status_api.reports.lock().unwrap().is_empty());
    assert!(h.store.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn feature_branch_failure_reports_but_skips_badge() {
    let h = harness_with(&[master_definition()]);

    h.bridge
        .handle(&envelope(vec![(
            "build_phase",
            build_phase_payload("widget", "BUILD", "FAILED", "feature-x", serde_json::json!([])),
        )]))
        .await
        .unwrap();

    let reports = h.status_api.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, Outcome::Failure);
    assert!(h.store.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn foreign_project_build_event_is_skipped_silently() {
    let h = harness_with(&[master_definition()]);

    h.bridge
        .handle(&envelope(vec![(
            "build_phase",
            build_phase_payload("gadget", "BUILD", "FAILED", "master", serde_json::json!([])),
        )]))
        .await
        .unwrap();

    assert!(h.status_api.reports.lock().unwrap().is_empty());
    assert!(h.store.puts.lock().unwrap().is_empty());
}

// ── Pipeline state events ──

#[tokio::test]
async fn pipeline_state_succeeded_reports_sha_from_execution() {
    let h = harness_with(&[master_definition()]);
    h.pipelines.executions.lock().unwrap().insert(
        ("widget".to_string(), "exec-1".to_string()),
        Execution {
            artifact_revisions: vec![ArtifactRevision {
                revision_id: "cafebabe".to_string(),
            }],
        },
    );

    h.bridge
        .handle(&envelope(vec![(
            "pipeline_state",
            serde_json::json!({
                "pipeline": "widget",
                "execution-id": "exec-1",
                "state": "SUCCEEDED"
            }),
        )]))
        .await
        .unwrap();

    let reports = h.status_api.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, Outcome::Success);
    assert_eq!(reports[0].description, "Pipeline succeeded");
    assert_eq!(reports[0].sha, "cafebabe");
    assert_eq!(reports[0].owner, "acme");
    assert_eq!(reports[0].repo, "widget");
}

#[tokio::test]
async fn unknown_pipeline_state_is_a_no_op() {
    let h = harness_with(&[master_definition()]);

    h.bridge
        .handle(&envelope(vec![(
            "pipeline_state",
            serde_json::json!({
                "pipeline": "widget",
                "execution-id": "exec-1",
                "state": "SOMETHING_ELSE"
            }),
        )]))
        .await
        .unwrap();

    assert!(h.status_api.reports.lock().unwrap().is_empty());
}

// ── Batch semantics ──

#[tokio::test]
async fn records_are_processed_in_order() {
    let h = harness_with(&[master_definition()]);

    h.bridge
        .handle(&envelope(vec![
            (
                "pull_request",
                pull_request_payload(42, "open", "feature/x", "headsha"),
            ),
            (
                "pull_request",
                pull_request_payload(42, "closed", "feature/x", "headsha"),
            ),
        ]))
        .await
        .unwrap();

    assert_eq!(*h.pipelines.started.lock().unwrap(), vec!["widget.pr-42"]);
    assert_eq!(*h.pipelines.deleted.lock().unwrap(), vec!["widget.pr-42"]);
}

#[tokio::test]
async fn first_error_stops_the_batch() {
    let h = harness_with(&[master_definition()]);

    let err = h
        .bridge
        .handle(&envelope(vec![
            ("bogus", serde_json::json!({})),
            ("push", push_payload("refs/heads/master", "abc123")),
        ]))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::InvalidEvent(_)));
    // The push behind the invalid record never ran.
    assert!(h.pipelines.started.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_payload_is_an_invalid_event() {
    let h = harness_with(&[master_definition()]);

    let err = h
        .bridge
        .handle(&Envelope {
            records: vec![EventRecord {
                event: "push".to_string(),
                payload: "{not json".to_string(),
            }],
        })
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::InvalidEvent(_)));
}
