use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::error::ApiError;
use crate::infrastructure::app_state::AppState;

// Re-export Claims for use in route handlers
pub use crate::infrastructure::auth::Claims;

/// Resolve the caller from the bearer token and attach their claims to the request
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(ApiError::unauthenticated)?;

    let claims = state.jwt_service.verify(token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::unauthenticated()
    })?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
