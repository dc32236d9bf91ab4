use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use tokio::sync::Mutex;

use crate::core::errors::ApiError;
use crate::session::{Session, SessionError};
use crate::state::AppState;
use crate::vector::LoadError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Sessions are only created by `POST /api/sessions`; every other route
/// requires an existing id.
async fn find_session(
    state: &AppState,
    session_id: &str,
) -> Result<Arc<Mutex<Session>>, ApiError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))
}

pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_id = Uuid::new_v4().to_string();
    state.sessions.get_or_create(&session_id).await;
    (StatusCode::CREATED, Json(json!({"session_id": session_id})))
}

pub async fn load_data(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(services) = state.services.as_ref() else {
        let missing = state.credentials.missing();
        return Err(SessionError::Load(LoadError::MissingCredentials(missing)).into());
    };

    let session = find_session(&state, &session_id).await?;
    let mut session = session.lock().await;
    let report = session
        .load(&services.gateway, &services.processor)
        .await?;

    Ok(Json(json!({
        "session_id": session_id,
        "data_loaded": session.data_loaded(),
        "report": report,
    })))
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let session = find_session(&state, &session_id).await?;
    let mut session = session.lock().await;
    let Some(services) = state.services.as_ref() else {
        return Err(SessionError::NotLoaded.into());
    };

    let reply = session.ask(&services.pipeline, message).await?;
    Ok(Json(reply))
}

pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = find_session(&state, &session_id).await?;
    let session = session.lock().await;

    Ok(Json(json!({
        "session_id": session.id(),
        "data_loaded": session.data_loaded(),
        "messages": session.messages(),
    })))
}

pub async fn clear_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = find_session(&state, &session_id).await?;
    session.lock().await.clear_history();
    Ok(Json(json!({"status": "success"})))
}

pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = find_session(&state, &session_id).await?;
    session.lock().await.reset();
    Ok(Json(json!({"status": "success"})))
}
