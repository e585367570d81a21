//! Visitor invitation handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use portcullis_invitation::VerifyError;
use portcullis_types::{InvitationId, InvitationStatus, VisitorInvitation};
use serde::{Deserialize, Serialize};

/// Verify request body
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub qr_token: String,
}

/// Verify response body
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub invitation: VisitorInvitation,
    pub verified_at: DateTime<Utc>,
}

/// Verify and consume a visitor credential.
///
/// A successful verification is one-shot: the credential comes back `used`
/// and a repeat of the same token conflicts.
pub async fn verify_visitor(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<Json<VerifyResponse>> {
    if request.qr_token.trim().is_empty() {
        return Err(ApiError::Validation("qr_token is empty".to_string()));
    }

    let verified = state
        .verifier
        .verify(&request.qr_token)
        .await
        .map_err(verify_error_to_api)?;

    Ok(Json(VerifyResponse {
        valid: true,
        invitation: verified.invitation,
        verified_at: verified.verified_at,
    }))
}

fn verify_error_to_api(err: VerifyError) -> ApiError {
    match err {
        VerifyError::NotFound => ApiError::NotFound("no invitation for that token".to_string()),
        VerifyError::Expired { invitation } => ApiError::Gone(format!(
            "invitation for {} expired at {}",
            invitation.visitor_name, invitation.valid_until
        )),
        VerifyError::AlreadyUsed { invitation } => ApiError::Conflict(format!(
            "invitation for {} was already used",
            invitation.visitor_name
        )),
        VerifyError::Registry(e) => e.into(),
    }
}

/// One invitation as listed, with the status derived at read time.
#[derive(Debug, Serialize)]
pub struct VisitorView {
    #[serde(flatten)]
    pub invitation: VisitorInvitation,

    /// Status as of this read; an expired window reads as `expired` even
    /// when the stored status has not caught up
    pub derived_status: InvitationStatus,
}

/// List invitations. Reads never persist the derived status.
pub async fn list_visitors(State(state): State<AppState>) -> ApiResult<Json<Vec<VisitorView>>> {
    let now = Utc::now();
    let invitations = state.registry.list_invitations().await?;

    let views = invitations
        .into_iter()
        .map(|invitation| VisitorView {
            derived_status: invitation.derived_status(now),
            invitation,
        })
        .collect();

    Ok(Json(views))
}

/// Create invitation request body
#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub visitor_name: String,
    pub host_unit: String,
    pub plate_number: Option<String>,
    pub valid_until: DateTime<Utc>,
}

/// Create a pending invitation with a fresh QR token.
pub async fn create_invitation(
    State(state): State<AppState>,
    Json(request): Json<CreateInvitationRequest>,
) -> ApiResult<(StatusCode, Json<VisitorInvitation>)> {
    if request.visitor_name.trim().is_empty() {
        return Err(ApiError::Validation("visitor_name is empty".to_string()));
    }
    let now = Utc::now();
    if request.valid_until <= now {
        return Err(ApiError::Validation(
            "valid_until must be in the future".to_string(),
        ));
    }

    let invitation = VisitorInvitation {
        id: InvitationId::generate(),
        visitor_name: request.visitor_name,
        host_unit: request.host_unit,
        plate_number: request.plate_number,
        qr_token: uuid::Uuid::new_v4().to_string(),
        valid_from: now,
        valid_until: request.valid_until,
        status: InvitationStatus::Pending,
    };

    state.registry.upsert_invitation(invitation.clone()).await?;
    tracing::info!(
        invitation = %invitation.id,
        visitor = %invitation.visitor_name,
        host_unit = %invitation.host_unit,
        "invitation created"
    );

    Ok((StatusCode::CREATED, Json(invitation)))
}
