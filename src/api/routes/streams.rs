use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::middleware::Claims;
use crate::api::AppState;
use crate::application::queue::{
    AddSong, AddSongInput, AdvanceQueue, CastVote, EmptyQueue, ListQueue, ListQueueInput,
    QueueView, RemoveSong, RemoveSongInput, RetractVote, VoteInput,
};
use crate::domain::entities::QueueEntry;
use crate::infrastructure::app_state::RoomEvent;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSongRequest {
    pub creator_id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQueueQuery {
    pub creator_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub stream_id: String,
    pub room_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StreamResponse {
    pub success: bool,
    pub stream: QueueEntry,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub success: bool,
    #[serde(flatten)]
    pub queue: QueueView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub success: bool,
    pub stream_id: String,
}

#[derive(Debug, Serialize)]
pub struct EmptyQueueResponse {
    pub success: bool,
    pub deleted: u64,
}

fn stream_event(event_type: &str, entry: &QueueEntry, user_id: &str) -> RoomEvent {
    RoomEvent::new(event_type, &entry.room_id, Some(user_id.to_string())).with_data(
        serde_json::json!({
            "streamId": entry.id,
            "videoId": entry.video_id,
        }),
    )
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/streams - Add a song to a room's queue
pub async fn add_song(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<AddSongRequest>,
) -> Result<(StatusCode, Json<StreamResponse>), ApiError> {
    if body.creator_id.trim().is_empty() {
        return Err(ApiError::validation("creatorId is required"));
    }

    let use_case = AddSong::new(
        state.queue_repo.clone(),
        state.analytics_repo.clone(),
        state.metadata.clone(),
        state.config.admission.clone(),
    )
    .with_deadline(state.request_deadline());

    let entry = use_case
        .execute(AddSongInput {
            room_id: body.creator_id,
            submitter_id: claims.user_id.clone(),
            url: body.url,
        })
        .await?;

    state.broadcast_event(stream_event("songAdded", &entry, &claims.user_id));

    Ok((
        StatusCode::CREATED,
        Json(StreamResponse {
            success: true,
            stream: entry,
        }),
    ))
}

/// GET /api/streams?creatorId= - List a room's queue
pub async fn list_queue(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQueueQuery>,
) -> Result<Json<QueueResponse>, ApiError> {
    let queue = ListQueue::new(state.queue_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(ListQueueInput {
            room_id: query.creator_id,
            viewer_id: claims.user_id,
        })
        .await?;

    Ok(Json(QueueResponse {
        success: true,
        queue,
    }))
}

/// POST /api/streams/upvote
pub async fn upvote(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let entry = CastVote::new(state.queue_repo.clone(), state.analytics_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(VoteInput {
            voter_id: claims.user_id.clone(),
            stream_id: body.stream_id,
            room_id: body.room_id,
        })
        .await?;

    state.broadcast_event(stream_event("upvoted", &entry, &claims.user_id));

    Ok(Json(VoteResponse {
        success: true,
        stream_id: entry.id,
    }))
}

/// POST /api/streams/downvote
pub async fn downvote(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let entry = RetractVote::new(state.queue_repo.clone(), state.analytics_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(VoteInput {
            voter_id: claims.user_id.clone(),
            stream_id: body.stream_id,
            room_id: body.room_id,
        })
        .await?;

    state.broadcast_event(stream_event("downvoted", &entry, &claims.user_id));

    Ok(Json(VoteResponse {
        success: true,
        stream_id: entry.id,
    }))
}

/// POST /api/streams/next - Play the next song of the caller's room
pub async fn next_stream(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<StreamResponse>, ApiError> {
    let entry = AdvanceQueue::new(state.queue_repo.clone(), state.analytics_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(&claims.user_id)
        .await?;

    state.broadcast_event(stream_event("streamAdvanced", &entry, &claims.user_id));

    Ok(Json(StreamResponse {
        success: true,
        stream: entry,
    }))
}

/// DELETE /api/streams/:streamId
pub async fn remove_stream(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(stream_id): Path<String>,
) -> Result<Json<StreamResponse>, ApiError> {
    let entry = RemoveSong::new(state.queue_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(RemoveSongInput {
            actor_id: claims.user_id.clone(),
            stream_id,
        })
        .await?;

    state.broadcast_event(stream_event("songRemoved", &entry, &claims.user_id));

    Ok(Json(StreamResponse {
        success: true,
        stream: entry,
    }))
}

/// POST /api/streams/empty - Clear the caller's room
pub async fn empty_queue(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<EmptyQueueResponse>, ApiError> {
    let deleted = EmptyQueue::new(state.queue_repo.clone())
        .with_deadline(state.request_deadline())
        .execute(&claims.user_id, &claims.user_id)
        .await?;

    state.broadcast_event(
        RoomEvent::new("queueEmptied", &claims.user_id, Some(claims.user_id.clone()))
            .with_data(serde_json::json!({ "deleted": deleted })),
    );

    Ok(Json(EmptyQueueResponse {
        success: true,
        deleted,
    }))
}
