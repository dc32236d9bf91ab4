//! Typed view over the merged `config.yml` + `secrets.yaml` document.
//!
//! Every section and field has a default, so an empty document yields a
//! fully usable configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub ingest: IngestConfig,
    pub vector_index: VectorIndexConfig,
    pub embedding: EmbeddingConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            cors_allowed_origins: defaults::local_origins(),
        }
    }
}

/// Where the catalog documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Static catalog PDFs. The first entry is the undergraduate catalog,
    /// the second the graduate catalog.
    pub pdf_urls: Vec<String>,
    pub undergraduate_courses_url: String,
    pub graduate_courses_url: String,
    pub undergraduate_codes: Vec<String>,
    pub graduate_codes: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            pdf_urls: defaults::PDF_URLS.iter().map(|s| s.to_string()).collect(),
            undergraduate_courses_url: defaults::UNDERGRADUATE_COURSES_URL.to_string(),
            graduate_courses_url: defaults::GRADUATE_COURSES_URL.to_string(),
            undergraduate_codes: defaults::UNDERGRADUATE_CODES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            graduate_codes: defaults::GRADUATE_CODES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Maximum overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// How many documents may be downloading at once. Results are still
    /// consumed in source order.
    pub fetch_concurrency: usize,
    pub fetch_timeout_secs: u64,
    pub embed_batch_size: usize,
    pub upsert_batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: defaults::CHUNK_SIZE,
            chunk_overlap: defaults::CHUNK_OVERLAP,
            fetch_concurrency: defaults::FETCH_CONCURRENCY,
            fetch_timeout_secs: defaults::FETCH_TIMEOUT_SECS,
            embed_batch_size: defaults::EMBED_BATCH_SIZE,
            upsert_batch_size: defaults::UPSERT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexConfig {
    pub index_name: String,
    pub namespace: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
    pub control_url: String,
    pub readiness_attempts: u32,
    pub readiness_interval_ms: u64,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            index_name: defaults::INDEX_NAME.to_string(),
            namespace: defaults::NAMESPACE.to_string(),
            dimension: defaults::EMBEDDING_DIMENSION,
            metric: defaults::METRIC.to_string(),
            cloud: defaults::CLOUD.to_string(),
            region: defaults::REGION.to_string(),
            control_url: defaults::PINECONE_CONTROL_URL.to_string(),
            readiness_attempts: defaults::READINESS_ATTEMPTS,
            readiness_interval_ms: defaults::READINESS_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::EMBEDDING_BASE_URL.to_string(),
            model: defaults::EMBEDDING_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub stop: Vec<String>,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Number of most recent history messages forwarded to the model.
    pub history_window: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::CHAT_BASE_URL.to_string(),
            model: defaults::CHAT_MODEL.to_string(),
            temperature: defaults::TEMPERATURE,
            max_tokens: defaults::MAX_TOKENS,
            top_p: defaults::TOP_P,
            stop: vec![defaults::STOP_SEQUENCE.to_string()],
            top_k: defaults::RETRIEVAL_TOP_K,
            history_window: defaults::HISTORY_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `info` or `catalog_advisor=debug,tower_http=info`.
    /// `RUST_LOG` wins when set.
    pub level: String,
    /// Relative to the project root unless absolute.
    pub directory: String,
    pub file_name: String,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            directory: defaults::LOG_DIRECTORY.to_string(),
            file_name: defaults::LOG_FILE_NAME.to_string(),
            rotation: LogRotation::Daily,
        }
    }
}
