//! Pinecone serverless index over REST.
//!
//! Collection management goes through the control plane
//! (`https://api.pinecone.io`); reads and writes go to the per-index host
//! returned when the index is described.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::OnceCell;

use super::{ScoredChunk, VectorIndex, VectorRecord};
use crate::core::config::VectorIndexConfig;
use crate::core::errors::RemoteError;

const SERVICE: &str = "pinecone";
const API_VERSION: &str = "2024-07";

pub struct PineconeIndex {
    config: VectorIndexConfig,
    client: Client,
    host: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    state: Option<String>,
}

impl IndexDescription {
    fn ready_host(&self) -> Option<&str> {
        let ready = self.status.as_ref().is_some_and(|s| s.ready);
        match self.host.as_deref() {
            Some(host) if ready && !host.is_empty() => Some(host),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexStats {
    #[serde(default)]
    namespaces: std::collections::HashMap<String, NamespaceStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: u64,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    namespace: &'a str,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: ChunkMetadata<'a>,
}

#[derive(Serialize)]
struct ChunkMetadata<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

impl PineconeIndex {
    pub fn new(config: VectorIndexConfig, api_key: &str) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "api-key",
            HeaderValue::from_str(api_key.trim())
                .map_err(|_| RemoteError::Config("invalid Pinecone API key".to_string()))?,
        );
        headers.insert(
            "x-pinecone-api-version",
            HeaderValue::from_static(API_VERSION),
        );
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| RemoteError::Config(format!("failed to build HTTP client: {}", err)))?;

        Ok(Self {
            config,
            client,
            host: OnceCell::new(),
        })
    }

    fn control_url(&self, path: &str) -> String {
        format!("{}{}", self.config.control_url.trim_end_matches('/'), path)
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>, RemoteError> {
        let res = self
            .client
            .get(self.control_url("/indexes"))
            .send()
            .await
            .map_err(RemoteError::transport(SERVICE))?;
        let res = RemoteError::check(SERVICE, res).await?;
        let list: IndexList = res.json().await.map_err(RemoteError::malformed(SERVICE))?;
        Ok(list.indexes)
    }

    async fn describe_index(&self) -> Result<IndexDescription, RemoteError> {
        let path = format!("/indexes/{}", self.config.index_name);
        let res = self
            .client
            .get(self.control_url(&path))
            .send()
            .await
            .map_err(RemoteError::transport(SERVICE))?;
        let res = RemoteError::check(SERVICE, res).await?;
        res.json().await.map_err(RemoteError::malformed(SERVICE))
    }

    async fn create_index(&self) -> Result<(), RemoteError> {
        let body = json!({
            "name": self.config.index_name,
            "dimension": self.config.dimension,
            "metric": self.config.metric,
            "spec": {
                "serverless": {
                    "cloud": self.config.cloud,
                    "region": self.config.region,
                }
            }
        });
        let res = self
            .client
            .post(self.control_url("/indexes"))
            .json(&body)
            .send()
            .await
            .map_err(RemoteError::transport(SERVICE))?;
        RemoteError::check(SERVICE, res).await?;
        Ok(())
    }

    /// Polls the index description until it reports ready with a host.
    async fn wait_until_ready(&self) -> Result<String, RemoteError> {
        let interval = Duration::from_millis(self.config.readiness_interval_ms);
        let attempts = self.config.readiness_attempts.max(1);
        let mut last_state = String::from("unknown");

        for attempt in 1..=attempts {
            let description = self.describe_index().await?;
            if let Some(host) = description.ready_host() {
                return Ok(host.to_string());
            }
            if let Some(state) = description.status.and_then(|s| s.state) {
                last_state = state;
            }
            tracing::debug!(
                "Index {} not ready yet ({}), attempt {}/{}",
                self.config.index_name,
                last_state,
                attempt,
                attempts
            );
            tokio::time::sleep(interval).await;
        }

        Err(RemoteError::NotReady {
            service: SERVICE,
            message: format!(
                "index {} still {} after {} checks",
                self.config.index_name, last_state, attempts
            ),
        })
    }

    /// Base URL of the data plane for this index.
    async fn data_url(&self, path: &str) -> Result<String, RemoteError> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let description = self.describe_index().await?;
                description
                    .host
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| RemoteError::NotReady {
                        service: SERVICE,
                        message: format!("index {} has no host yet", self.config.index_name),
                    })
            })
            .await?;
        Ok(format!("{}{}", normalize_host(host), path))
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn ensure(&self) -> Result<bool, RemoteError> {
        let indexes = self.list_indexes().await?;
        if let Some(existing) = indexes.iter().find(|i| i.name == self.config.index_name) {
            if let Some(host) = existing.host.as_deref().filter(|h| !h.is_empty()) {
                let _ = self.host.set(host.to_string());
            }
            tracing::info!("Using existing index {}", self.config.index_name);
            return Ok(false);
        }

        tracing::info!(
            "Creating index {} ({} dims, {}, {}/{})",
            self.config.index_name,
            self.config.dimension,
            self.config.metric,
            self.config.cloud,
            self.config.region
        );
        self.create_index().await?;
        let host = self.wait_until_ready().await?;
        let _ = self.host.set(host);
        tracing::info!("Index {} is ready", self.config.index_name);
        Ok(true)
    }

    async fn namespace_vector_count(&self, namespace: &str) -> Result<u64, RemoteError> {
        let url = self.data_url("/describe_index_stats").await?;
        let res = self
            .client
            .post(&url)
            .json(&json!({}))
            .send()
            .await
            .map_err(RemoteError::transport(SERVICE))?;
        let res = RemoteError::check(SERVICE, res).await?;
        let stats: IndexStats = res.json().await.map_err(RemoteError::malformed(SERVICE))?;
        Ok(stats
            .namespaces
            .get(namespace)
            .map(|ns| ns.vector_count)
            .unwrap_or(0))
    }

    async fn upsert(
        &self,
        namespace: &str,
        records: &[VectorRecord],
    ) -> Result<usize, RemoteError> {
        if records.is_empty() {
            return Ok(0);
        }
        let url = self.data_url("/vectors/upsert").await?;
        let body = UpsertRequest {
            vectors: records
                .iter()
                .map(|r| UpsertVector {
                    id: &r.id,
                    values: &r.values,
                    metadata: ChunkMetadata { text: &r.text },
                })
                .collect(),
            namespace,
        };
        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(RemoteError::transport(SERVICE))?;
        let res = RemoteError::check(SERVICE, res).await?;
        let payload: UpsertResponse = res.json().await.map_err(RemoteError::malformed(SERVICE))?;
        Ok(payload.upserted_count)
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RemoteError> {
        let url = self.data_url("/query").await?;
        let body = QueryRequest {
            namespace,
            vector,
            top_k,
            include_metadata: true,
        };
        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(RemoteError::transport(SERVICE))?;
        let res = RemoteError::check(SERVICE, res).await?;
        let payload: QueryResponse = res.json().await.map_err(RemoteError::malformed(SERVICE))?;

        Ok(payload
            .matches
            .into_iter()
            .map(|m| ScoredChunk {
                text: m
                    .metadata
                    .as_ref()
                    .and_then(|meta| meta.get("text"))
                    .and_then(|text| text.as_str())
                    .unwrap_or_default()
                    .to_string(),
                id: m.id,
                score: m.score,
            })
            .collect())
    }
}
