#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use catalog_advisor::core::config::{ChatConfig, SourcesConfig};
use catalog_advisor::core::errors::RemoteError;
use catalog_advisor::ingest::{
    DocumentFetcher, DocumentProcessor, FetchError, RecursiveSplitter,
};
use catalog_advisor::llm::{ChatMessage, ChatModel, CompletionParams, Embedder};
use catalog_advisor::pipeline::QueryPipeline;
use catalog_advisor::sources::{SourceLocator, SourceUrl};
use catalog_advisor::state::Services;
use catalog_advisor::vector::{ScoredChunk, VectorIndex, VectorIndexGateway, VectorRecord};

pub const NAMESPACE: &str = "course_catalog";

/// Sources config with no PDFs and one webpage per code under
/// `https://catalog.test/`.
pub fn webpage_sources(codes: &[&str]) -> SourcesConfig {
    SourcesConfig {
        pdf_urls: Vec::new(),
        undergraduate_courses_url: "https://catalog.test/".to_string(),
        graduate_courses_url: "https://grad.catalog.test/".to_string(),
        undergraduate_codes: codes.iter().map(|c| c.to_string()).collect(),
        graduate_codes: Vec::new(),
    }
}

/// Serves canned documents by URL; anything unknown is an HTTP 500.
#[derive(Default)]
pub struct CannedFetcher {
    documents: HashMap<String, String>,
    pub calls: AtomicUsize,
    yielding: bool,
}

impl CannedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: &str, text: &str) -> Self {
        self.documents.insert(url.to_string(), text.to_string());
        self
    }

    /// Gives up the executor once per fetch so concurrent loads interleave.
    pub fn yielding(mut self) -> Self {
        self.yielding = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentFetcher for CannedFetcher {
    async fn fetch(&self, source: &SourceUrl) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.yielding {
            tokio::task::yield_now().await;
        }
        self.documents
            .get(&source.url)
            .cloned()
            .ok_or(FetchError::Status(500))
    }
}

/// In-memory index. Queries return stored chunks in insertion order.
#[derive(Default)]
pub struct MemoryIndex {
    pub existing_count: AtomicU64,
    pub records: Mutex<Vec<VectorRecord>>,
    pub ensure_calls: AtomicUsize,
    pub upsert_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub fail_stats: bool,
}

impl MemoryIndex {
    pub fn with_existing(count: u64) -> Self {
        Self {
            existing_count: AtomicU64::new(count),
            ..Self::default()
        }
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<VectorRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure(&self) -> Result<bool, RemoteError> {
        let previous = self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        Ok(previous == 0)
    }

    async fn namespace_vector_count(&self, namespace: &str) -> Result<u64, RemoteError> {
        assert_eq!(namespace, NAMESPACE);
        if self.fail_stats {
            return Err(RemoteError::Status {
                service: "memory",
                status: 503,
                body: "stats unavailable".to_string(),
            });
        }
        let stored = self.records.lock().unwrap().len() as u64;
        Ok(self.existing_count.load(Ordering::SeqCst) + stored)
    }

    async fn upsert(&self, namespace: &str, records: &[VectorRecord]) -> Result<usize, RemoteError> {
        assert_eq!(namespace, NAMESPACE);
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(records.len())
    }

    async fn query(
        &self,
        namespace: &str,
        _vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RemoteError> {
        assert_eq!(namespace, NAMESPACE);
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .take(top_k)
            .map(|r| ScoredChunk {
                id: r.id.clone(),
                score: 1.0,
                text: r.text.clone(),
            })
            .collect())
    }
}

/// Returns a constant vector per text and counts calls.
#[derive(Default)]
pub struct CountingEmbedder {
    pub document_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    fn dimension(&self) -> usize {
        4
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RemoteError> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| vec![t.len() as f32; 4]).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RemoteError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![text.len() as f32; 4])
    }
}

/// Replies with a fixed string and remembers the last prompt.
pub struct ScriptedChat {
    reply: Result<String, u16>,
    pub last_messages: Mutex<Vec<ChatMessage>>,
}

impl ScriptedChat {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, RemoteError> {
        assert_eq!(params.stop, vec!["\nUser:".to_string()]);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(status) => Err(RemoteError::Status {
                service: "scripted",
                status: *status,
                body: "unavailable".to_string(),
            }),
        }
    }
}

pub struct Harness {
    pub fetcher: Arc<CannedFetcher>,
    pub index: Arc<MemoryIndex>,
    pub embedder: Arc<CountingEmbedder>,
    pub chat: Arc<ScriptedChat>,
    pub sources: SourcesConfig,
}

impl Harness {
    pub fn new(
        fetcher: CannedFetcher,
        index: MemoryIndex,
        chat: ScriptedChat,
        sources: SourcesConfig,
    ) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            index: Arc::new(index),
            embedder: Arc::new(CountingEmbedder::default()),
            chat: Arc::new(chat),
            sources,
        }
    }

    pub fn gateway(&self) -> VectorIndexGateway {
        VectorIndexGateway::new(self.index.clone(), self.embedder.clone(), NAMESPACE)
    }

    pub fn processor(&self) -> DocumentProcessor {
        DocumentProcessor::new(
            SourceLocator::new(self.sources.clone()),
            self.fetcher.clone(),
            RecursiveSplitter::default(),
        )
    }

    pub fn pipeline(&self) -> QueryPipeline {
        QueryPipeline::new(
            self.chat.clone(),
            &ChatConfig::default(),
            self.sources.pdf_urls.clone(),
        )
    }

    pub fn services(&self) -> Services {
        Services::new(self.gateway(), self.processor(), self.pipeline())
    }
}
