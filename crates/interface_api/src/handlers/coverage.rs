//! Base coverage and coverage definition handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use core_kernel::PlanId;
use domain_application::{BaseCoverageRequest, BaseCoverageSaved, CoverageDefinition};

use crate::auth::CurrentPrincipal;
use crate::error::ApiError;
use crate::AppState;

/// Creates the base coverage of an application
pub async fn save_base_coverage(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(application_number): Path<String>,
    body: Result<Json<BaseCoverageRequest>, JsonRejection>,
) -> Result<Json<BaseCoverageSaved>, ApiError> {
    let Json(request) = body?;
    let saved = state.intake.save_base_coverage(&application_number, &request).await?;

    tracing::info!(
        user = %principal.username,
        application_number = %application_number,
        coverage_id = %saved.coverage_id,
        "Base coverage created"
    );
    Ok(Json(saved))
}

/// Lists the riders and other coverages a plan offers
pub async fn get_additional_definitions(
    State(state): State<AppState>,
    _principal: CurrentPrincipal,
    Path(plan_id): Path<String>,
) -> Result<Json<Vec<CoverageDefinition>>, ApiError> {
    let definitions = state
        .intake
        .additional_coverage_definitions(&PlanId::new(plan_id))
        .await?;
    Ok(Json(definitions))
}
