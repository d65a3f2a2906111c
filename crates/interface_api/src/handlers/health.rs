//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use core_kernel::HealthCheckResult;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness report with one entry per adapter
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub checks: Vec<HealthCheckResult>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check (includes storage adapters)
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let (details, intake, codes) = tokio::join!(
        state.details.health_check(),
        state.intake.health_check(),
        state.codes.health_check()
    );
    let checks = vec![details, intake, codes];

    let ready = checks.iter().all(HealthCheckResult::is_operational);
    if !ready {
        for check in checks.iter().filter(|c| !c.is_operational()) {
            warn!(adapter = %check.adapter_id, message = ?check.message, "Adapter not ready");
        }
    }

    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = ReadinessResponse {
        status: if ready { "ready" } else { "unavailable" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };
    (status, Json(body))
}
