pub mod embedding;
pub mod groq;
pub mod provider;
pub mod types;

pub use embedding::GeminiEmbedder;
pub use groq::GroqChatModel;
pub use provider::{ChatModel, Embedder};
pub use types::{ChatMessage, CompletionParams, Role};
