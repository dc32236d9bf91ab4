use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::provider::ChatModel;
use super::types::{ChatMessage, CompletionParams};
use crate::core::config::ChatConfig;
use crate::core::errors::RemoteError;

const SERVICE: &str = "groq";

/// OpenAI-compatible chat completions endpoint hosted by Groq.
#[derive(Clone)]
pub struct GroqChatModel {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

impl GroqChatModel {
    pub fn new(config: &ChatConfig, api_key: impl Into<String>) -> Self {
        Self::with_client(config, api_key, Client::new())
    }

    pub fn with_client(config: &ChatConfig, api_key: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            client,
        }
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatModel for GroqChatModel {
    fn name(&self) -> &str {
        SERVICE
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, RemoteError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "top_p": params.top_p,
            "stream": false,
        });
        if !params.stop.is_empty() {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("stop".to_string(), json!(params.stop));
            }
        }

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RemoteError::transport(SERVICE))?;
        let res = RemoteError::check(SERVICE, res).await?;

        let payload: CompletionResponse =
            res.json().await.map_err(RemoteError::malformed(SERVICE))?;

        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| RemoteError::Malformed {
                service: SERVICE,
                message: "response contained no choices".to_string(),
            })
    }
}
