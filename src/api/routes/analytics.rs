use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::middleware::Claims;
use crate::api::AppState;
use crate::application::analytics::{
    BackfillInput, BackfillRoomAnalytics, GetRecommendation, GetRecommendationInput, GetStats,
    GetStatsInput, GetTopAdded, GetTopLiked, GetTopSongsInput, GetTrending, GetTrendingInput,
    GetWeeklyAdds, GetWeeklyAddsInput, RecommendedSong, RoomBackfill, TopSong, TrendingSong,
    WeeklyAdds,
};
use crate::domain::entities::StatsSnapshot;
use crate::infrastructure::app_state::RoomEvent;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomQuery {
    pub room_id: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAddsQuery {
    pub room_id: String,
    pub week_start: Option<String>,
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillRequest {
    pub room_id: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct WeeklyAddsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub weekly: WeeklyAdds,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub success: bool,
    pub songs: Vec<TrendingSong>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    /// Highest ranked candidate, if any
    pub best: Option<RecommendedSong>,
    pub songs: Vec<RecommendedSong>,
}

#[derive(Debug, Serialize)]
pub struct TopSongsResponse {
    pub success: bool,
    pub songs: Vec<TopSong>,
}

#[derive(Debug, Serialize)]
pub struct BackfillResponse {
    pub success: bool,
    pub rooms: Vec<RoomBackfill>,
}

fn require_room(room_id: &str) -> Result<(), ApiError> {
    if room_id.trim().is_empty() {
        return Err(ApiError::validation("roomId is required"));
    }
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/analytics/stats?roomId=
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<StatsResponse>, ApiError> {
    require_room(&query.room_id)?;

    let stats = GetStats::new(state.analytics_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(GetStatsInput {
            user_id: claims.user_id,
            room_id: query.room_id,
        })
        .await?;

    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

/// GET /api/analytics/weekly-adds?roomId=&weekStart=&tzOffsetMinutes=
pub async fn get_weekly_adds(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WeeklyAddsQuery>,
) -> Result<Json<WeeklyAddsResponse>, ApiError> {
    require_room(&query.room_id)?;

    let weekly = GetWeeklyAdds::new(state.queue_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(GetWeeklyAddsInput {
            user_id: claims.user_id,
            room_id: query.room_id,
            week_start: query.week_start,
            tz_offset_minutes: query.tz_offset_minutes,
        })
        .await?;

    Ok(Json(WeeklyAddsResponse {
        success: true,
        weekly,
    }))
}

/// GET /api/analytics/trending?roomId=&limit=
pub async fn get_trending(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<TrendingResponse>, ApiError> {
    require_room(&query.room_id)?;

    let songs = GetTrending::new(state.queue_repo.clone(), state.analytics_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(GetTrendingInput {
            room_id: query.room_id,
            limit: query.limit,
        })
        .await?;

    Ok(Json(TrendingResponse {
        success: true,
        songs,
    }))
}

/// GET /api/analytics/recommendation?roomId=&limit=
pub async fn get_recommendation(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    require_room(&query.room_id)?;

    let songs = GetRecommendation::new(
        state.queue_repo.clone(),
        state.analytics_repo.clone(),
        state.config.windows,
    )
    .with_deadline(state.request_deadline())
    .execute(GetRecommendationInput {
        room_id: query.room_id,
        user_id: claims.user_id,
        limit: query.limit,
    })
    .await?;

    Ok(Json(RecommendationResponse {
        success: true,
        best: songs.first().cloned(),
        songs,
    }))
}

/// GET /api/analytics/you-add-most?roomId=&limit=
pub async fn get_top_added(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<TopSongsResponse>, ApiError> {
    require_room(&query.room_id)?;

    let songs = GetTopAdded::new(state.queue_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(GetTopSongsInput {
            user_id: claims.user_id,
            room_id: query.room_id,
            limit: query.limit,
        })
        .await?;

    Ok(Json(TopSongsResponse {
        success: true,
        songs,
    }))
}

/// GET /api/analytics/your-top-liked?roomId=&limit=
pub async fn get_top_liked(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<TopSongsResponse>, ApiError> {
    require_room(&query.room_id)?;

    let songs = GetTopLiked::new(state.queue_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(GetTopSongsInput {
            user_id: claims.user_id,
            room_id: query.room_id,
            limit: query.limit,
        })
        .await?;

    Ok(Json(TopSongsResponse {
        success: true,
        songs,
    }))
}

/// POST /api/analytics/backfill - Recompute the caller's room analytics
pub async fn backfill(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<BackfillRequest>,
) -> Result<Json<BackfillResponse>, ApiError> {
    if body.room_id != claims.user_id {
        return Err(ApiError::forbidden("Only the room owner can backfill analytics"));
    }

    let rooms = BackfillRoomAnalytics::new(
        state.queue_repo.clone(),
        state.analytics_repo.clone(),
        state.config.windows.trending_play_window_secs,
    )
    .with_deadline(state.request_deadline())
    .execute(BackfillInput {
        room_id: Some(body.room_id.clone()),
    })
    .await?;

    state.broadcast_event(RoomEvent::new(
        "analyticsRebuilt",
        &body.room_id,
        Some(claims.user_id),
    ));

    Ok(Json(BackfillResponse {
        success: true,
        rooms,
    }))
}
