use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::config::{AppConfig, AppPaths, ConfigService, Credentials};
use crate::ingest::{DocumentProcessor, HttpFetcher, RecursiveSplitter, SplitterConfig};
use crate::llm::{GeminiEmbedder, GroqChatModel};
use crate::pipeline::QueryPipeline;
use crate::session::SessionStore;
use crate::sources::SourceLocator;
use crate::vector::{PineconeIndex, VectorIndexGateway};

pub mod error;

use error::InitializationError;

/// Remote-backed components. Only built when every credential is present.
pub struct Services {
    pub gateway: VectorIndexGateway,
    pub processor: DocumentProcessor,
    pub pipeline: QueryPipeline,
}

impl Services {
    pub fn new(
        gateway: VectorIndexGateway,
        processor: DocumentProcessor,
        pipeline: QueryPipeline,
    ) -> Self {
        Self {
            gateway,
            processor,
            pipeline,
        }
    }

    /// Wires the hosted adapters (Pinecone, Gemini, Groq, HTTP fetcher).
    /// Returns `Ok(None)` when a credential is missing.
    pub fn connect(
        settings: &AppConfig,
        credentials: &Credentials,
    ) -> Result<Option<Self>, InitializationError> {
        let (Some(google), Some(groq), Some(pinecone)) = (
            credentials.google_api_key.as_deref(),
            credentials.groq_api_key.as_deref(),
            credentials.pinecone_api_key.as_deref(),
        ) else {
            return Ok(None);
        };

        let index = PineconeIndex::new(settings.vector_index.clone(), pinecone)
            .map_err(InitializationError::VectorIndex)?;
        let embedder = GeminiEmbedder::new(
            &settings.embedding,
            google,
            settings.vector_index.dimension,
        )
        .with_batch_size(settings.ingest.embed_batch_size);
        let gateway = VectorIndexGateway::new(
            Arc::new(index),
            Arc::new(embedder),
            settings.vector_index.namespace.clone(),
        )
        .with_upsert_batch_size(settings.ingest.upsert_batch_size);

        let fetcher = HttpFetcher::new(Duration::from_secs(settings.ingest.fetch_timeout_secs))
            .map_err(InitializationError::Fetcher)?;
        let splitter = RecursiveSplitter::new(SplitterConfig {
            chunk_size: settings.ingest.chunk_size,
            chunk_overlap: settings.ingest.chunk_overlap,
        });
        let processor = DocumentProcessor::new(
            SourceLocator::new(settings.sources.clone()),
            Arc::new(fetcher),
            splitter,
        )
        .with_concurrency(settings.ingest.fetch_concurrency);

        let chat = GroqChatModel::new(&settings.chat, groq);
        let pipeline = QueryPipeline::new(
            Arc::new(chat),
            &settings.chat,
            settings.sources.pdf_urls.clone(),
        );

        Ok(Some(Self::new(gateway, processor, pipeline)))
    }
}

/// Global application state shared across all routes.
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: AppConfig,
    pub credentials: Credentials,
    pub services: Option<Services>,
    pub sessions: SessionStore,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Loads configuration, resolves credentials and connects the hosted
    /// services if every key is available.
    pub fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let merged = config.load_config().map_err(InitializationError::Config)?;
        let settings = crate::core::config::service::settings_from_value(&merged)
            .map_err(InitializationError::Config)?;
        let credentials = Credentials::resolve(&merged);

        let services = Services::connect(&settings, &credentials)?;
        if services.is_none() {
            tracing::warn!(
                "Data loading disabled, missing credentials: {}",
                credentials.missing().join(", ")
            );
        }

        Ok(Arc::new(Self::from_parts(
            paths,
            settings,
            credentials,
            services,
        )))
    }

    pub fn from_parts(
        paths: Arc<AppPaths>,
        settings: AppConfig,
        credentials: Credentials,
        services: Option<Services>,
    ) -> Self {
        Self {
            config: ConfigService::new(paths.clone()),
            paths,
            settings,
            credentials,
            services,
            sessions: SessionStore::new(),
            started_at: Utc::now(),
        }
    }
}
