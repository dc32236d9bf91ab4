//! Vector storage for catalog chunks.
//!
//! This module provides:
//! - `VectorIndex` trait for the remote collection (create, count, upsert, query)
//! - `PineconeIndex`, the hosted serverless implementation
//! - `VectorIndexGateway`, which decides between reusing stored vectors and
//!   running a fresh ingestion

mod gateway;
mod pinecone;

pub use gateway::{IndexHandle, LoadError, LoadOutcome, VectorIndexGateway};
pub use pinecone::PineconeIndex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::RemoteError;

/// A chunk and its embedding, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub text: String,
}

/// Result of a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// Identifier of the stored vector
    pub id: String,
    /// Similarity score (higher is more similar)
    pub score: f32,
    /// Chunk text stored alongside the vector
    pub text: String,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Creates the collection if it does not exist yet. Returns `true` when
    /// a new collection was created.
    async fn ensure(&self) -> Result<bool, RemoteError>;

    /// Number of vectors stored in `namespace` (0 when it does not exist).
    async fn namespace_vector_count(&self, namespace: &str) -> Result<u64, RemoteError>;

    /// Writes one batch of records, returning how many were stored.
    async fn upsert(&self, namespace: &str, records: &[VectorRecord])
        -> Result<usize, RemoteError>;

    /// Nearest neighbours of `vector` within `namespace`.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, RemoteError>;
}
