//! Owner and beneficiary handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use domain_application::{BeneficiaryAllocationRequest, OwnerSaveRequest, OwnerSaveResponse};

use crate::auth::CurrentPrincipal;
use crate::error::ApiError;
use crate::AppState;

/// Result of a beneficiary allocation save
#[derive(Debug, Serialize)]
pub struct AllocationSaveResponse {
    pub saved: usize,
}

/// Captures the owners of an application
pub async fn save_owners(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    body: Result<Json<OwnerSaveRequest>, JsonRejection>,
) -> Result<Json<OwnerSaveResponse>, ApiError> {
    let Json(request) = body?;
    let response = state.intake.save_owners(&principal, request).await?;
    Ok(Json(response))
}

/// Records beneficiary allocations
pub async fn save_beneficiary_allocations(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    body: Result<Json<BeneficiaryAllocationRequest>, JsonRejection>,
) -> Result<Json<AllocationSaveResponse>, ApiError> {
    let Json(request) = body?;
    let saved = state.details.save_beneficiary_allocations(&request).await?;

    tracing::info!(
        user = %principal.username,
        application_number = %request.application_form_number,
        saved,
        "Beneficiary allocations saved"
    );
    Ok(Json(AllocationSaveResponse { saved }))
}
