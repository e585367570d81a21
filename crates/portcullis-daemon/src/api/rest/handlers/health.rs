//! Health and status handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
}

/// Daemon liveness endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
    })
}

/// Recognition service health response
#[derive(Debug, Serialize)]
pub struct RecognitionHealthResponse {
    pub status: String,
}

/// Proxy the recognition service's liveness probe.
pub async fn recognition_health(
    State(state): State<AppState>,
) -> ApiResult<Json<RecognitionHealthResponse>> {
    state
        .recognition
        .health()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(RecognitionHealthResponse {
        status: "healthy".to_string(),
    }))
}
