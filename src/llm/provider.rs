use async_trait::async_trait;

use super::types::{ChatMessage, CompletionParams};
use crate::core::errors::RemoteError;

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// provider name used in logs (e.g. "groq")
    fn name(&self) -> &str;

    /// model identifier sent with each request
    fn model(&self) -> &str;

    /// chat completion (non-streaming), returns the assistant text
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, RemoteError>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// length of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// embed passages for storage
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError>;

    /// embed a single search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RemoteError>;
}
