//! Pipeline service client — fetch, create, start, and delete pipelines.

use async_trait::async_trait;

use crate::models::pipeline::{Execution, PipelineDefinition};

/// Errors surfaced by pipeline service operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineServiceError {
    /// Creation raced another writer; callers reconcile by re-fetching.
    #[error("pipeline {0} already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Operations the bridge consumes from the pipeline service.
///
/// Constructed once at startup and passed into the handler explicitly so
/// tests can substitute fakes.
#[async_trait]
pub trait PipelineService: Send + Sync {
    /// Fetch a pipeline definition; `None` when no pipeline has that name.
    async fn get_pipeline(
        &self,
        name: &str,
    ) -> Result<Option<PipelineDefinition>, PipelineServiceError>;

    /// Create a pipeline from a definition.
    async fn create_pipeline(
        &self,
        definition: &PipelineDefinition,
    ) -> Result<PipelineDefinition, PipelineServiceError>;

    /// Start an execution of the named pipeline. Fire-and-forget.
    async fn start_execution(&self, name: &str) -> Result<(), PipelineServiceError>;

    /// Delete the named pipeline. Fire-and-forget.
    async fn delete_pipeline(&self, name: &str) -> Result<(), PipelineServiceError>;

    /// Fetch one execution, including its artifact revisions.
    async fn get_execution(
        &self,
        pipeline: &str,
        execution_id: &str,
    ) -> Result<Execution, PipelineServiceError>;
}

/// HTTP client for the pipeline service's REST API.
pub struct HttpPipelineService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPipelineService {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, PipelineServiceError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(PipelineServiceError::Other(anyhow::anyhow!(
            "pipeline service returned {status}: {text}"
        )))
    }
}

#[async_trait]
impl PipelineService for HttpPipelineService {
    async fn get_pipeline(
        &self,
        name: &str,
    ) -> Result<Option<PipelineDefinition>, PipelineServiceError> {
        let url = format!("{}/pipelines/{name}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(anyhow::Error::from)?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(resp).await?;
        let definition = resp.json().await.map_err(anyhow::Error::from)?;
        Ok(Some(definition))
    }

    async fn create_pipeline(
        &self,
        definition: &PipelineDefinition,
    ) -> Result<PipelineDefinition, PipelineServiceError> {
        let url = format!("{}/pipelines", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(definition)
            .send()
            .await
            .map_err(anyhow::Error::from)?;

        if resp.status() == reqwest::StatusCode::CONFLICT {
            return Err(PipelineServiceError::AlreadyExists(definition.name.clone()));
        }
        let resp = Self::check(resp).await?;
        let created = resp.json().await.map_err(anyhow::Error::from)?;
        Ok(created)
    }

    async fn start_execution(&self, name: &str) -> Result<(), PipelineServiceError> {
        let url = format!("{}/pipelines/{name}/executions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(anyhow::Error::from)?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete_pipeline(&self, name: &str) -> Result<(), PipelineServiceError> {
        let url = format!("{}/pipelines/{name}", self.base_url);
        let resp = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(anyhow::Error::from)?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn get_execution(
        &self,
        pipeline: &str,
        execution_id: &str,
    ) -> Result<Execution, PipelineServiceError> {
        let url = format!("{}/pipelines/{pipeline}/executions/{execution_id}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(anyhow::Error::from)?;
        let resp = Self::check(resp).await?;
        let execution = resp.json().await.map_err(anyhow::Error::from)?;
        Ok(execution)
    }
}
