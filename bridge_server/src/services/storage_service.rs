//! Public object storage client — badge uploads.

use async_trait::async_trait;

/// Object storage the badges are published to.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write a public-read object with an explicit content type and cache
    /// headers.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
        cache_control: &str,
    ) -> anyhow::Result<()>;
}

/// S3-style HTTP object store client.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpObjectStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
        cache_control: &str,
    ) -> anyhow::Result<()> {
        let url = format!("{}/{bucket}/{key}", self.base_url);
        let resp = self
            .client
            .put(&url)
            .header("x-amz-acl", "public-read")
            .header("Content-Type", content_type)
            .header("Cache-Control", cache_control)
            .body(body.to_vec())
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("object store returned {status}: {text}");
        }
        Ok(())
    }
}
