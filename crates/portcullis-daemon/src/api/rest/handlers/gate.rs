//! Manual gate control handlers
//!
//! Manual commands go straight to the channel; they never touch the attempt
//! audit trail, which belongs to the pipeline. The correlation id in the
//! response ties the command to the structured log line.

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use portcullis_types::CorrelationId;
use serde::{Deserialize, Serialize};

/// Manual command request body
#[derive(Debug, Default, Deserialize)]
pub struct GateCommandRequest {
    /// Who asked for this, for the log line
    #[serde(default)]
    pub triggered_by: Option<String>,

    /// Free-form reason
    #[serde(default)]
    pub reason: Option<String>,

    /// Auto-close override for open commands, in milliseconds
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// Manual command response
#[derive(Debug, Serialize)]
pub struct GateCommandResponse {
    pub command: String,
    pub correlation_id: CorrelationId,
    pub published_at: DateTime<Utc>,
}

/// Open the gate manually.
pub async fn open_gate(
    State(state): State<AppState>,
    Json(request): Json<GateCommandRequest>,
) -> ApiResult<Json<GateCommandResponse>> {
    let correlation_id = CorrelationId::generate();
    log_manual("OPEN_GATE", &correlation_id, &request);

    let ack = match request.duration_ms {
        Some(duration_ms) => {
            state
                .channel
                .open_gate_for(correlation_id.clone(), duration_ms)
                .await
        }
        None => state.channel.open_gate(correlation_id.clone()).await,
    }
    .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(GateCommandResponse {
        command: "OPEN_GATE".to_string(),
        correlation_id,
        published_at: ack.published_at,
    }))
}

/// Close the gate manually.
pub async fn close_gate(
    State(state): State<AppState>,
    Json(request): Json<GateCommandRequest>,
) -> ApiResult<Json<GateCommandResponse>> {
    let correlation_id = CorrelationId::generate();
    log_manual("CLOSE_GATE", &correlation_id, &request);

    let ack = state
        .channel
        .close_gate(correlation_id.clone())
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(GateCommandResponse {
        command: "CLOSE_GATE".to_string(),
        correlation_id,
        published_at: ack.published_at,
    }))
}

/// Ask the edge device for a fresh capture.
pub async fn request_capture(
    State(state): State<AppState>,
    Json(request): Json<GateCommandRequest>,
) -> ApiResult<Json<GateCommandResponse>> {
    let correlation_id = CorrelationId::generate();
    log_manual("CAPTURE_IMAGE", &correlation_id, &request);

    let ack = state
        .channel
        .request_capture(correlation_id.clone())
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(GateCommandResponse {
        command: "CAPTURE_IMAGE".to_string(),
        correlation_id,
        published_at: ack.published_at,
    }))
}

fn log_manual(command: &str, correlation_id: &CorrelationId, request: &GateCommandRequest) {
    tracing::info!(
        command,
        correlation = %correlation_id,
        triggered_by = request.triggered_by.as_deref().unwrap_or("unknown"),
        reason = request.reason.as_deref().unwrap_or("-"),
        "manual gate command"
    );
}
