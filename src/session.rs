//! Per-conversation state: the loaded index, identifier map and chat
//! history.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::core::errors::{ApiError, RemoteError};
use crate::ingest::{DocumentProcessor, IdentifierMap, IngestReport};
use crate::llm::ChatMessage;
use crate::pipeline::QueryPipeline;
use crate::vector::{IndexHandle, LoadError, VectorIndexGateway};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please load data first")]
    NotLoaded,
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Query(#[from] RemoteError),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotLoaded => ApiError::BadRequest(err.to_string()),
            SessionError::Load(LoadError::MissingCredentials(_)) => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            SessionError::Load(LoadError::IndexCreation(remote))
            | SessionError::Load(LoadError::Remote(remote))
            | SessionError::Query(remote) => remote.into(),
            SessionError::Load(other) => ApiError::Upstream(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    pub reply: String,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

pub struct Session {
    id: String,
    handle: Option<IndexHandle>,
    data_loaded: bool,
    messages: Vec<ChatMessage>,
    identifiers: IdentifierMap,
    last_report: Option<IngestReport>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handle: None,
            data_loaded: false,
            messages: Vec::new(),
            identifiers: IdentifierMap::new(),
            last_report: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data_loaded(&self) -> bool {
        self.data_loaded
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn identifiers(&self) -> &IdentifierMap {
        &self.identifiers
    }

    pub fn last_report(&self) -> Option<&IngestReport> {
        self.last_report.as_ref()
    }

    /// Populates (or reconnects to) the index. The session is only marked
    /// loaded when this succeeds.
    pub async fn load(
        &mut self,
        gateway: &VectorIndexGateway,
        processor: &DocumentProcessor,
    ) -> Result<IngestReport, SessionError> {
        let outcome = gateway.load_data(processor).await?;
        tracing::info!(
            "Session {} loaded data ({} identifiers tracked)",
            self.id,
            outcome.identifiers.len()
        );
        self.handle = Some(outcome.handle);
        self.identifiers = outcome.identifiers;
        self.last_report = Some(outcome.report.clone());
        self.data_loaded = true;
        Ok(outcome.report)
    }

    /// Runs one turn. The question is kept in the history even if answering
    /// fails.
    pub async fn ask(
        &mut self,
        pipeline: &QueryPipeline,
        query: &str,
    ) -> Result<TurnReply, SessionError> {
        let handle = match (&self.handle, self.data_loaded) {
            (Some(handle), true) => handle.clone(),
            _ => return Err(SessionError::NotLoaded),
        };

        self.messages.push(ChatMessage::user(query));
        let history = &self.messages[..self.messages.len() - 1];

        let started = Instant::now();
        let reply = pipeline
            .answer(&handle, &self.identifiers, query, history)
            .await?;
        let elapsed = started.elapsed();
        tracing::info!("Session {} answered in {:.2?}", self.id, elapsed);

        self.messages.push(ChatMessage::assistant(reply.clone()));
        Ok(TurnReply { reply, elapsed })
    }

    pub fn clear_history(&mut self) {
        self.messages.clear();
    }

    pub fn reset(&mut self) {
        self.handle = None;
        self.data_loaded = false;
        self.messages.clear();
        self.identifiers = IdentifierMap::new();
        self.last_report = None;
    }
}

/// Sessions by id. Each one sits behind its own lock so turns in the same
/// session run one at a time.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create(&self, id: &str) -> Arc<Mutex<Session>> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return session.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(id))))
            .clone()
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
