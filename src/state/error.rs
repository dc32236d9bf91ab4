use thiserror::Error;

use crate::core::errors::{ApiError, RemoteError};
use crate::ingest::FetchError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] ApiError),

    #[error("Failed to build document fetcher: {0}")]
    Fetcher(#[source] FetchError),

    #[error("Failed to build vector index client: {0}")]
    VectorIndex(#[source] RemoteError),
}
