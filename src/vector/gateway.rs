use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use super::{ScoredChunk, VectorIndex, VectorRecord};
use crate::core::errors::RemoteError;
use crate::ingest::{DocumentProcessor, IdentifierMap, IngestError, IngestReport};
use crate::llm::Embedder;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
    #[error("failed to create or connect to the vector index: {0}")]
    IndexCreation(#[source] RemoteError),
    #[error("no text was extracted from the catalog sources")]
    EmptyCorpus { report: IngestReport },
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl From<IngestError> for LoadError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::EmptyCorpus { report } => LoadError::EmptyCorpus { report },
        }
    }
}

/// Read access to the populated namespace.
#[derive(Clone)]
pub struct IndexHandle {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    namespace: String,
}

impl IndexHandle {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            index,
            embedder,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Embeds `text` as a query and returns the `k` closest chunks.
    pub async fn query_similar(&self, text: &str, k: usize) -> Result<Vec<ScoredChunk>, RemoteError> {
        let vector = self.embedder.embed_query(text).await?;
        self.index.query(&self.namespace, &vector, k).await
    }
}

/// Result of a successful load.
pub struct LoadOutcome {
    pub handle: IndexHandle,
    /// Empty when existing vectors were reused.
    pub identifiers: IdentifierMap,
    pub report: IngestReport,
}

pub struct VectorIndexGateway {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    namespace: String,
    upsert_batch_size: usize,
    created: AtomicBool,
    /// Serializes the count check and ingestion so concurrent loads of an
    /// empty namespace upsert the corpus once.
    ingest_lock: Mutex<()>,
}

impl VectorIndexGateway {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            index,
            embedder,
            namespace: namespace.into(),
            upsert_batch_size: 100,
            created: AtomicBool::new(false),
            ingest_lock: Mutex::new(()),
        }
    }

    pub fn with_upsert_batch_size(mut self, batch_size: usize) -> Self {
        self.upsert_batch_size = batch_size.max(1);
        self
    }

    fn handle(&self) -> IndexHandle {
        IndexHandle::new(self.index.clone(), self.embedder.clone(), self.namespace.clone())
    }

    /// Makes sure the remote collection exists. Only contacts the service
    /// until the first success.
    pub async fn ensure_index(&self) -> Result<(), LoadError> {
        if self.created.load(Ordering::Acquire) {
            return Ok(());
        }
        match self.index.ensure().await {
            Ok(created) => {
                if created {
                    tracing::info!("Created vector index");
                }
                self.created.store(true, Ordering::Release);
                Ok(())
            }
            Err(err) => {
                tracing::error!("Failed to create or connect to index: {}", err);
                Err(LoadError::IndexCreation(err))
            }
        }
    }

    /// Returns a handle to the namespace, ingesting the catalog first when
    /// the namespace is empty. Callers arriving while another load is
    /// ingesting wait for it and then reuse its vectors.
    pub async fn load_data(&self, processor: &DocumentProcessor) -> Result<LoadOutcome, LoadError> {
        self.ensure_index().await?;
        let _ingesting = self.ingest_lock.lock().await;

        match self.index.namespace_vector_count(&self.namespace).await {
            Ok(count) if count > 0 => {
                tracing::info!(
                    "Namespace {} already holds {} vectors, skipping ingestion",
                    self.namespace,
                    count
                );
                let report = IngestReport {
                    reused_existing: true,
                    existing_vectors: count,
                    ..IngestReport::default()
                };
                return Ok(LoadOutcome {
                    handle: self.handle(),
                    identifiers: IdentifierMap::new(),
                    report,
                });
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!("Could not read index stats, ingesting anyway: {}", err);
            }
        }

        let corpus = processor.process_documents().await?;
        let mut report = corpus.report;

        tracing::info!("Embedding {} chunks", corpus.chunks.len());
        let vectors = self.embedder.embed_documents(&corpus.chunks).await?;

        let records: Vec<VectorRecord> = corpus
            .chunks
            .into_iter()
            .zip(vectors)
            .map(|(text, values)| VectorRecord {
                id: uuid::Uuid::new_v4().to_string(),
                values,
                text,
            })
            .collect();

        let mut upserted = 0;
        for batch in records.chunks(self.upsert_batch_size) {
            upserted += self.index.upsert(&self.namespace, batch).await?;
        }
        report.vectors_upserted = upserted;
        tracing::info!("Upserted {} vectors into {}", upserted, self.namespace);

        Ok(LoadOutcome {
            handle: self.handle(),
            identifiers: corpus.identifiers,
            report,
        })
    }
}
