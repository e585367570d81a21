//! Vehicle registry handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use portcullis_types::{
    normalize_plate, EntryStatus, OwnerInfo, RegistryEntry, RegistryEntryId,
};
use serde::{Deserialize, Serialize};

/// List registered vehicles.
pub async fn list_vehicles(State(state): State<AppState>) -> ApiResult<Json<Vec<RegistryEntry>>> {
    let entries = state.registry.list_entries().await?;
    Ok(Json(entries))
}

/// Create vehicle request body
#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    /// Plate as entered; normalized before storage
    pub plate: String,
    pub owner_name: String,
    pub unit: String,
    #[serde(default)]
    pub inactive: bool,
}

/// Register a vehicle. The stored plate is the canonical form.
pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> ApiResult<(StatusCode, Json<RegistryEntry>)> {
    let normalized = normalize_plate(&request.plate);
    if normalized.is_empty() {
        return Err(ApiError::Validation(format!(
            "plate {:?} normalizes to nothing",
            request.plate
        )));
    }

    let entry = RegistryEntry {
        id: RegistryEntryId::generate(),
        normalized_plate: normalized,
        owner: OwnerInfo {
            name: request.owner_name,
            unit: request.unit,
        },
        status: if request.inactive {
            EntryStatus::Inactive
        } else {
            EntryStatus::Active
        },
        created_at: Utc::now(),
    };

    state.registry.upsert_entry(entry.clone()).await?;
    tracing::info!(
        entry = %entry.id,
        plate = %entry.normalized_plate,
        "vehicle registered"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteVehicleResponse {
    pub deleted: bool,
}

/// Remove a vehicle entry.
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteVehicleResponse>> {
    let deleted = state
        .registry
        .delete_entry(&RegistryEntryId::new(&id))
        .await?;

    if !deleted {
        return Err(ApiError::NotFound(format!("vehicle {} not found", id)));
    }

    tracing::info!(entry = %id, "vehicle deleted");
    Ok(Json(DeleteVehicleResponse { deleted }))
}
