use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "credentials_present": state.credentials.is_complete(),
        "missing_credentials": state.credentials.missing(),
        "data_loading_enabled": state.services.is_some(),
        "session_count": state.sessions.len().await,
        "started_at": state.started_at.to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
