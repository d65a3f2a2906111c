//! Premium quote handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;

use domain_application::{ApplicationEnvelope, PremiumResult};

use crate::auth::CurrentPrincipal;
use crate::error::ApiError;
use crate::AppState;

/// Rates every coverage of the posted application
///
/// Responds with the flat premium document, e.g.
/// `{"COV-1_premium": 50.0, "APP-1_totalAnnualPremium": 50.0, ...}`.
pub async fn calculate_premium(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    body: Result<Json<ApplicationEnvelope>, JsonRejection>,
) -> Result<Json<PremiumResult>, ApiError> {
    let Json(envelope) = body?;
    let result = state.premium.calculate(&envelope.application)?;

    info!(
        user = %principal.username,
        application_form_id = %result.application_form_id,
        coverages = result.coverages.len(),
        "Premium quoted"
    );
    Ok(Json(result))
}
