//! Meilisearch client
//!
//! Thin HTTP client for the supervised search engine: document writes, deletes,
//! searches and the liveness endpoint.

use crate::config::SearchConfig;
use crate::document::Document;
use crate::index::traits::{IndexError, IndexResult, SearchIndex};
use crate::supervisor::HealthProbe;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

/// Acknowledgement returned by the engine for asynchronous writes
#[derive(Debug, Deserialize)]
struct TaskInfo {
    #[serde(rename = "taskUid")]
    task_uid: u64,
}

/// Search index backed by a Meilisearch instance
#[derive(Debug, Clone)]
pub struct MeilisearchIndex {
    client: Client,
    base_url: Url,
    index_name: String,
    api_key: Option<String>,
    probe_timeout: Duration,
}

impl MeilisearchIndex {
    /// Creates a client for the engine described by `config`
    pub fn new(config: &SearchConfig) -> IndexResult<Self> {
        Self::with_base_url(&config.base_url(), config)
    }

    /// Creates a client for an engine at an explicit base URL
    pub fn with_base_url(base_url: &str, config: &SearchConfig) -> IndexResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            index_name: config.index_name.clone(),
            api_key: (!config.api_key.is_empty()).then(|| config.api_key.clone()),
            probe_timeout: config.probe_timeout(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn endpoint(&self, path: &str) -> IndexResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Runs a search against the index and returns the engine's raw response
    pub async fn search(&self, query: &str, limit: usize) -> IndexResult<serde_json::Value> {
        let url = self.endpoint(&format!("indexes/{}/search", self.index_name))?;
        let response = self
            .authorize(self.client.post(url))
            .json(&json!({ "q": query, "limit": limit }))
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Checks the engine's health endpoint within the probe timeout
    pub async fn check_health(&self) -> bool {
        let url = match self.endpoint("health") {
            Ok(url) => url,
            Err(_) => return false,
        };

        match self
            .client
            .get(url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Search health probe failed: {}", e);
                false
            }
        }
    }
}

/// Turns non-2xx responses into errors carrying the engine's message
async fn check_status(response: Response) -> IndexResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(IndexError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SearchIndex for MeilisearchIndex {
    async fn index(&self, doc: &Document) -> IndexResult<()> {
        let url = self.endpoint(&format!("indexes/{}/documents", self.index_name))?;
        let response = self
            .authorize(self.client.post(url))
            .json(&[doc])
            .send()
            .await?;

        let task: TaskInfo = check_status(response).await?.json().await?;
        tracing::info!("Indexing {} with task UID {}", doc.url, task.task_uid);
        Ok(())
    }

    async fn delete(&self, id: &str) -> IndexResult<()> {
        let url = self.endpoint(&format!("indexes/{}/documents/{}", self.index_name, id))?;
        let response = self.authorize(self.client.delete(url)).send().await?;

        let task: TaskInfo = check_status(response).await?.json().await?;
        tracing::info!("Deleting {} with task UID {}", id, task.task_uid);
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for MeilisearchIndex {
    async fn is_healthy(&self) -> bool {
        self.check_health().await
    }
}
