//! Capture scan and audit log handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use portcullis_types::{AccessAttempt, AccessDecision};
use serde::{Deserialize, Serialize};

/// Run a captured image through the access pipeline.
///
/// Expects a multipart form with an `image` part. The decision is returned
/// synchronously; the gate command, when authorized, has already been handed
/// to the channel by the time this responds.
pub async fn scan_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AccessDecision>> {
    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() == Some("image") {
            let filename = field
                .file_name()
                .unwrap_or("capture.jpg")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read image: {}", e)))?;
            image = Some((bytes.to_vec(), filename));
        }
    }

    let (bytes, filename) =
        image.ok_or_else(|| ApiError::BadRequest("missing `image` part".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::Validation("image is empty".to_string()));
    }

    let decision = state.pipeline.process(bytes, &filename).await?;
    Ok(Json(decision))
}

/// Attempt listing query params
#[derive(Debug, Deserialize)]
pub struct ListAttemptsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Attempt listing response
#[derive(Debug, Serialize)]
pub struct ListAttemptsResponse {
    pub attempts: Vec<AccessAttempt>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// List audit records, newest first.
pub async fn list_attempts(
    State(state): State<AppState>,
    Query(query): Query<ListAttemptsQuery>,
) -> ApiResult<Json<ListAttemptsResponse>> {
    let attempts = state
        .registry
        .list_attempts(query.limit, query.offset)
        .await?;
    let total = state.registry.count_attempts().await?;

    Ok(Json(ListAttemptsResponse {
        attempts,
        total,
        limit: query.limit,
        offset: query.offset,
    }))
}
