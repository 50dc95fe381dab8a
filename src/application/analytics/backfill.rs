use std::sync::Arc;

use serde::Serialize;

use crate::application::Deadline;
use crate::domain::repositories::{AnalyticsRepository, QueueRepository, RepositoryError};
use crate::domain::services::{compute_trending, compute_user_stats};

pub struct BackfillInput {
    /// Every room with at least one entry when absent
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomBackfill {
    pub room_id: String,
    pub stats_rows: usize,
    pub trending_rows: usize,
}

/// Recompute derived analytics rows from raw entries and votes.
///
/// Replaces a room's rows rather than accumulating, so running it twice
/// leaves the same rows behind.
pub struct BackfillRoomAnalytics<Q: QueueRepository, A: AnalyticsRepository> {
    queue_repo: Arc<Q>,
    analytics_repo: Arc<A>,
    play_window_secs: i64,
    deadline: Deadline,
}

impl<Q: QueueRepository, A: AnalyticsRepository> BackfillRoomAnalytics<Q, A> {
    pub fn new(queue_repo: Arc<Q>, analytics_repo: Arc<A>, play_window_secs: i64) -> Self {
        Self {
            queue_repo,
            analytics_repo,
            play_window_secs,
            deadline: Deadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn execute(&self, input: BackfillInput) -> Result<Vec<RoomBackfill>, BackfillError> {
        self.deadline.run(self.run(input)).await
    }

    async fn run(&self, input: BackfillInput) -> Result<Vec<RoomBackfill>, BackfillError> {
        let rooms = match input.room_id {
            Some(room_id) => vec![room_id],
            None => self.queue_repo.list_room_ids().await?,
        };

        let mut results = Vec::with_capacity(rooms.len());
        for room_id in rooms {
            results.push(self.backfill_room(&room_id).await?);
        }

        Ok(results)
    }

    async fn backfill_room(&self, room_id: &str) -> Result<RoomBackfill, BackfillError> {
        let now = chrono::Utc::now().timestamp();

        let entries = self.queue_repo.list_room_entries(room_id).await?;
        let votes = self.queue_repo.list_room_votes(room_id).await?;

        let stats = compute_user_stats(room_id, &entries, &votes);
        let trending = compute_trending(room_id, &entries, &votes, now - self.play_window_secs);

        self.analytics_repo
            .replace_room_analytics(room_id, &stats, &trending)
            .await?;

        tracing::info!(
            "Backfilled room {}: {} entries, {} votes -> {} stats rows, {} trending rows",
            room_id,
            entries.len(),
            votes.len(),
            stats.len(),
            trending.len()
        );

        Ok(RoomBackfill {
            room_id: room_id.to_string(),
            stats_rows: stats.len(),
            trending_rows: trending.len(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackfillError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
