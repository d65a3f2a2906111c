//! Coverage and medical detail handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use core_kernel::{CoverageId, RoleId};
use domain_application::{CoverageDetail, DetailRow, SaveCoverageDetailsRequest, SaveOutcome};

use crate::auth::CurrentPrincipal;
use crate::error::ApiError;
use crate::AppState;

/// Result of a medical detail save
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalSaveResponse {
    pub role_id: RoleId,
    pub stored: usize,
}

/// Saves the coverage detail form
pub async fn save_coverage_details(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(coverage_id): Path<String>,
    body: Result<Json<SaveCoverageDetailsRequest>, JsonRejection>,
) -> Result<Json<SaveOutcome>, ApiError> {
    let Json(request) = body?;
    let detail = CoverageDetail::try_from(request)?;

    let coverage_id = CoverageId::new(coverage_id);
    let outcome = state.details.save_coverage_details(&coverage_id, &detail).await?;

    tracing::info!(user = %principal.username, coverage_id = %coverage_id, "Coverage details saved");
    Ok(Json(outcome))
}

/// Loads the stored coverage detail
pub async fn get_coverage_details(
    State(state): State<AppState>,
    _principal: CurrentPrincipal,
    Path(coverage_id): Path<String>,
) -> Result<Json<CoverageDetail>, ApiError> {
    let detail = state.details.load_coverage_details(&CoverageId::new(coverage_id)).await?;
    Ok(Json(detail))
}

/// Replaces a role's medical answers
pub async fn save_medical_details(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(role_id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<MedicalSaveResponse>, ApiError> {
    let Json(answers) = body?;

    let role_id = RoleId::new(role_id);
    let stored = state.details.save_medical_details(&role_id, &answers).await?;

    tracing::info!(user = %principal.username, role_id = %role_id, stored, "Medical details saved");
    Ok(Json(MedicalSaveResponse { role_id, stored }))
}

/// Lists a role's stored medical answers
pub async fn get_medical_details(
    State(state): State<AppState>,
    _principal: CurrentPrincipal,
    Path(role_id): Path<String>,
) -> Result<Json<Vec<DetailRow>>, ApiError> {
    let rows = state.details.load_medical_details(&RoleId::new(role_id)).await?;
    Ok(Json(rows))
}
