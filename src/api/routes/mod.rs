pub mod analytics;
pub mod health;
pub mod streams;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::api::middleware::auth_middleware;
use crate::api::sse::sse_handler;
use crate::api::AppState;

/// Create the main API router
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/streams", create_streams_router(state.clone()))
        .nest("/analytics", create_analytics_router(state.clone()))
        .route("/events", get(sse_handler))
        .route("/health", get(health::health_handler))
        .with_state(state)
}

/// Queue routes, all authenticated
fn create_streams_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(streams::add_song).get(streams::list_queue))
        .route("/upvote", post(streams::upvote))
        .route("/downvote", post(streams::downvote))
        .route("/next", post(streams::next_stream))
        .route("/empty", post(streams::empty_queue))
        .route("/:streamId", delete(streams::remove_stream))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

/// Analytics routes, all authenticated
fn create_analytics_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(analytics::get_stats))
        .route("/weekly-adds", get(analytics::get_weekly_adds))
        .route("/trending", get(analytics::get_trending))
        .route("/recommendation", get(analytics::get_recommendation))
        .route("/you-add-most", get(analytics::get_top_added))
        .route("/your-top-liked", get(analytics::get_top_liked))
        .route("/backfill", post(analytics::backfill))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
