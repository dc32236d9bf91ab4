//! Gemini text embeddings over the `batchEmbedContents` REST endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::provider::Embedder;
use crate::core::config::EmbeddingConfig;
use crate::core::errors::RemoteError;

const SERVICE: &str = "gemini";

/// The endpoint rejects batches larger than this.
pub const MAX_BATCH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: TaskType,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct BatchResponse {
    #[serde(default)]
    embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
struct Embedding {
    values: Vec<f32>,
}

#[derive(Clone)]
pub struct GeminiEmbedder {
    base_url: String,
    model: String,
    api_key: String,
    dimension: usize,
    batch_size: usize,
    client: Client,
}

impl GeminiEmbedder {
    pub fn new(config: &EmbeddingConfig, api_key: impl Into<String>, dimension: usize) -> Self {
        let model = if config.model.starts_with("models/") {
            config.model.clone()
        } else {
            format!("models/{}", config.model)
        };
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model,
            api_key: api_key.into(),
            dimension,
            batch_size: MAX_BATCH,
            client: Client::new(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH);
        self
    }

    async fn embed_batch(
        &self,
        texts: &[String],
        task_type: TaskType,
    ) -> Result<Vec<Vec<f32>>, RemoteError> {
        let url = format!("{}/{}:batchEmbedContents", self.base_url, self.model);
        let body = BatchRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: &self.model,
                    content: Content {
                        parts: [Part { text }],
                    },
                    task_type,
                })
                .collect(),
        };

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RemoteError::transport(SERVICE))?;
        let res = RemoteError::check(SERVICE, res).await?;

        let payload: BatchResponse = res.json().await.map_err(RemoteError::malformed(SERVICE))?;
        if payload.embeddings.len() != texts.len() {
            return Err(RemoteError::Malformed {
                service: SERVICE,
                message: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    payload.embeddings.len()
                ),
            });
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for embedding in payload.embeddings {
            if embedding.values.len() != self.dimension {
                return Err(RemoteError::Malformed {
                    service: SERVICE,
                    message: format!(
                        "embedding has dimension {}, expected {}",
                        embedding.values.len(),
                        self.dimension
                    ),
                });
            }
            vectors.push(embedding.values);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_batch(batch, TaskType::RetrievalDocument).await?);
            tracing::debug!("Embedded {}/{} chunks", vectors.len(), texts.len());
        }
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RemoteError> {
        let mut vectors = self
            .embed_batch(&[text.to_string()], TaskType::RetrievalQuery)
            .await?;
        vectors.pop().ok_or_else(|| RemoteError::Malformed {
            service: SERVICE,
            message: "no embedding returned for query".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_batch_embed_shape() {
        let body = BatchRequest {
            requests: vec![EmbedRequest {
                model: "models/embedding-001",
                content: Content {
                    parts: [Part { text: "CSE 2050" }],
                },
                task_type: TaskType::RetrievalQuery,
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "requests": [{
                    "model": "models/embedding-001",
                    "content": {"parts": [{"text": "CSE 2050"}]},
                    "taskType": "RETRIEVAL_QUERY"
                }]
            })
        );
    }

    #[test]
    fn model_name_gets_models_prefix() {
        let config = EmbeddingConfig {
            base_url: "https://x.test/v1beta/".into(),
            model: "embedding-001".into(),
        };
        let embedder = GeminiEmbedder::new(&config, "key", 768).with_batch_size(500);
        assert_eq!(embedder.model, "models/embedding-001");
        assert_eq!(embedder.base_url, "https://x.test/v1beta");
        assert_eq!(embedder.batch_size, MAX_BATCH);
    }
}
