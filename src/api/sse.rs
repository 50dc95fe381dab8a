use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;

use crate::infrastructure::app_state::AppState;

const HEARTBEAT: Duration = Duration::from_secs(20);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SseParams {
    /// Only forward events of this room
    room_id: Option<String>,
}

/// GET /api/events - Room events as server-sent events
pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SseParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // new_receiver() yields an active receiver, so broadcasts reach this client
    let mut receiver = state.event_sender.new_receiver();
    let room_filter = params.room_id;

    let stream = async_stream::stream! {
        tracing::debug!("SSE stream started (room filter: {:?})", room_filter);

        yield Ok(Event::default()
            .event("connected")
            .data(serde_json::json!({
                "message": "Connected to SSE stream",
                "timestamp": chrono::Utc::now().timestamp_millis()
            }).to_string()));

        let mut heartbeat_interval = tokio::time::interval(HEARTBEAT);

        loop {
            tokio::select! {
                _ = heartbeat_interval.tick() => {
                    tracing::trace!("SSE heartbeat");
                    yield Ok(Event::default().comment("heartbeat"));
                }
                result = receiver.recv() => {
                    match result {
                        Ok(event) => {
                            if room_filter.as_deref().is_some_and(|room| room != event.room_id) {
                                continue;
                            }
                            match serde_json::to_string(&event) {
                                Ok(json) => yield Ok(Event::default().event("event").data(json)),
                                Err(e) => tracing::warn!("Failed to serialize room event: {}", e),
                            }
                        }
                        Err(async_broadcast::RecvError::Overflowed(skipped)) => {
                            tracing::warn!("SSE client lagging, {} events skipped", skipped);
                        }
                        Err(e) => {
                            tracing::warn!("SSE receiver error: {:?}, closing stream", e);
                            break;
                        }
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
