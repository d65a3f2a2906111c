//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use core_kernel::Principal;

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Resolves the session token to a `Principal` and stores it in the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = authenticate(
        request.headers(),
        &state.config.jwt_secret,
        &state.config.session_cookie_name,
    )
    .map_err(|e| {
        warn!(error = %e, uri = %request.uri(), "Authentication failed");
        ApiError::Unauthorized
    })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Audit logging middleware
///
/// Logs all API requests with the acting principal
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user = request
        .extensions()
        .get::<Principal>()
        .map(|p| p.username.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
