//! Code table handlers

use axum::{extract::State, Json};

use domain_application::Dropdowns;

use crate::auth::CurrentPrincipal;
use crate::error::ApiError;
use crate::AppState;

/// Dropdown lists for the address forms
pub async fn get_dropdowns(
    State(state): State<AppState>,
    _principal: CurrentPrincipal,
) -> Result<Json<Dropdowns>, ApiError> {
    Ok(Json(state.codes.dropdowns().await?))
}
