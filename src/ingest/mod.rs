//! Document ingestion: download, text extraction, identifier tracking and
//! chunking.

pub mod fetcher;
pub mod processor;
pub mod splitter;

use serde::Serialize;

pub use crate::sources::SourceKind;

pub use fetcher::{DocumentFetcher, FetchError, HttpFetcher};
pub use processor::{
    extract_identifiers, identify_source_urls, Citation, DocumentProcessor, IdentifierMap,
    IngestError, ProcessedCorpus,
};
pub use splitter::{RecursiveSplitter, SplitterConfig};

/// Outcome of a single source download.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub url: String,
    pub kind: SourceKind,
    pub ok: bool,
    pub status: String,
    pub characters: usize,
}

/// Summary of one data load, returned to whoever triggered it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub sources: Vec<SourceOutcome>,
    pub total_characters: usize,
    pub chunk_count: usize,
    pub vectors_upserted: usize,
    pub reused_existing: bool,
    pub existing_vectors: u64,
}

impl IngestReport {
    pub fn succeeded(&self) -> usize {
        self.sources.iter().filter(|s| s.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.sources.iter().filter(|s| !s.ok).count()
    }
}
