use serde::{Deserialize, Serialize};

use crate::core::config::ChatConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Decoding parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub stop: Vec<String>,
}

impl From<&ChatConfig> for CompletionParams {
    fn from(config: &ChatConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
            stop: config.stop.clone(),
        }
    }
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}
