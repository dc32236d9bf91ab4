use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Failure talking to one of the hosted services (vector database,
/// embedding API, chat completion API).
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service} response was malformed: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
    #[error("{service} did not become ready: {message}")]
    NotReady {
        service: &'static str,
        message: String,
    },
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl RemoteError {
    pub fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| RemoteError::Transport { service, source }
    }

    pub fn malformed<E: std::fmt::Display>(service: &'static str) -> impl FnOnce(E) -> Self {
        move |err| RemoteError::Malformed {
            service,
            message: err.to_string(),
        }
    }

    /// Passes successful responses through and turns everything else into
    /// a `Status` error carrying the response body.
    pub async fn check(
        service: &'static str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        Err(RemoteError::Status {
            service,
            status: status.as_u16(),
            body,
        })
    }
}

impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Config(msg) => ApiError::Internal(msg),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}
