//! HTTP API Layer
//!
//! This crate provides the REST API for application intake using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: One module per resource
//! - **Middleware**: Authentication, request ids, tracing, audit logging
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(config, detail_store, intake_store, code_lookup, Arc::new(UuidIdGenerator));
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::IdGenerator;
use domain_application::{
    CodeLookupPort, CodeService, DetailService, DetailStorePort, IntakeService, IntakeStorePort, PremiumService,
};

use crate::config::ApiConfig;
use crate::handlers::{codes, coverage, details, health, parties, premium};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub premium: PremiumService,
    pub details: DetailService,
    pub intake: IntakeService,
    pub codes: CodeService,
}

impl AppState {
    /// Wires the services over the given storage adapters
    pub fn new(
        config: ApiConfig,
        detail_store: Arc<dyn DetailStorePort>,
        intake_store: Arc<dyn IntakeStorePort>,
        code_lookup: Arc<dyn CodeLookupPort>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            premium: PremiumService::new(),
            details: DetailService::new(detail_store),
            intake: IntakeService::new(intake_store, ids),
            codes: CodeService::new(code_lookup),
        }
    }
}

/// Creates the main API router
///
/// Public health routes sit at the root; everything under `/api/v1`
/// requires an authenticated principal.
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let coverage_routes = Router::new()
        .route("/premium/calculate", post(premium::calculate_premium))
        .route("/base/:application_number", post(coverage::save_base_coverage))
        .route(
            "/additional-definitions/:plan_id",
            get(coverage::get_additional_definitions),
        )
        .route(
            "/:coverage_id/details",
            get(details::get_coverage_details).put(details::save_coverage_details),
        );

    let role_routes = Router::new().route(
        "/:role_id/medical",
        get(details::get_medical_details).put(details::save_medical_details),
    );

    let code_routes = Router::new().route("/dropdowns", get(codes::get_dropdowns));

    let party_routes = Router::new()
        .route("/owners", post(parties::save_owners))
        .route("/beneficiaries/allocations", post(parties::save_beneficiary_allocations));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/coverage", coverage_routes)
        .nest("/roles", role_routes)
        .nest("/codes", code_routes)
        .merge(party_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
