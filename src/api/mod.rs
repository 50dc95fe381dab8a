pub mod error;
pub mod middleware;
pub mod routes;
pub mod sse;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Re-export for convenience
pub use crate::infrastructure::app_state::AppState;
pub use error::{ApiError, ErrorResponse};

/// Build the full HTTP application
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", routes::create_api_router(state.clone()))
        .route("/health", axum::routing::get(routes::health::health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
