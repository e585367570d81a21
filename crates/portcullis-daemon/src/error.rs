//! Error types for portcullis-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portcullis_pipeline::PipelineError;
use portcullis_recognition::RecognitionError;
use portcullis_registry::RegistryError;
use portcullis_types::AccessError;
use serde::Serialize;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("server error: {0}")]
    Server(String),

    /// Command channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Validation error
    #[error("validation error: {0}")]
    Validation(String),

    /// Credential already consumed
    #[error("conflict: {0}")]
    Conflict(String),

    /// Credential no longer valid
    #[error("gone: {0}")]
    Gone(String),

    /// An external collaborator is down
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// An external collaborator did not answer in time
    #[error("upstream timeout: {0}")]
    Timeout(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Gone(_) => (StatusCode::GONE, "GONE"),
            ApiError::Upstream(_) => (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE"),
            ApiError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Unavailable(msg) => ApiError::Upstream(msg),
            RegistryError::DuplicateKey(msg) => ApiError::Validation(msg),
            RegistryError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<RecognitionError> for ApiError {
    fn from(err: RecognitionError) -> Self {
        match err {
            RecognitionError::Timeout(d) => {
                ApiError::Timeout(format!("recognition service after {:?}", d))
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match &err.source {
            AccessError::Timeout(_) => ApiError::Timeout(err.to_string()),
            AccessError::ServiceUnavailable(_) => ApiError::Upstream(err.to_string()),
            AccessError::Validation(_) => ApiError::Validation(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
