use std::sync::Arc;

use super::prompt::build_messages;
use super::response::{append_sources, clean_response};
use crate::core::config::ChatConfig;
use crate::core::errors::RemoteError;
use crate::ingest::{identify_source_urls, IdentifierMap};
use crate::llm::{ChatMessage, ChatModel, CompletionParams};
use crate::vector::IndexHandle;

/// Retrieval, prompting and post-processing for a single question.
pub struct QueryPipeline {
    chat: Arc<dyn ChatModel>,
    params: CompletionParams,
    top_k: usize,
    history_window: usize,
    pdf_urls: Vec<String>,
}

impl QueryPipeline {
    pub fn new(chat: Arc<dyn ChatModel>, config: &ChatConfig, pdf_urls: Vec<String>) -> Self {
        Self {
            chat,
            params: CompletionParams::from(config),
            top_k: config.top_k,
            history_window: config.history_window,
            pdf_urls,
        }
    }

    pub async fn answer(
        &self,
        handle: &IndexHandle,
        identifiers: &IdentifierMap,
        query: &str,
        history: &[ChatMessage],
    ) -> Result<String, RemoteError> {
        let matches = handle.query_similar(query, self.top_k).await?;
        tracing::debug!("Retrieved {} chunks for query", matches.len());

        let context = matches
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let citations = identify_source_urls(&context, identifiers, &self.pdf_urls);

        let messages = build_messages(query, &context, history, self.history_window);
        let raw = self.chat.complete(&messages, &self.params).await?;
        tracing::debug!("{} ({}) returned {} characters", self.chat.name(), self.chat.model(), raw.len());

        Ok(append_sources(clean_response(&raw), &citations))
    }
}
