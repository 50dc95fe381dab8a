use std::sync::Arc;

use serde::Serialize;

use crate::application::analytics::{
    load_song_details, AnalyticsQueryError, SongDetails, TrendingAggregator,
};
use crate::application::Deadline;
use crate::domain::repositories::{AnalyticsRepository, QueueRepository};

pub struct GetTrendingInput {
    pub room_id: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingSong {
    pub video_id: String,
    pub trending_score: i64,
    pub recent_upvotes: i64,
    pub recent_plays: i64,
    pub last_updated: i64,
    #[serde(flatten)]
    pub details: Option<SongDetails>,
}

/// Room's top trending songs with their display details
pub struct GetTrending<Q: QueueRepository, A: AnalyticsRepository> {
    queue_repo: Arc<Q>,
    trending: TrendingAggregator<A>,
    deadline: Deadline,
}

impl<Q: QueueRepository, A: AnalyticsRepository> GetTrending<Q, A> {
    pub fn new(queue_repo: Arc<Q>, analytics_repo: Arc<A>) -> Self {
        Self {
            queue_repo,
            trending: TrendingAggregator::new(analytics_repo),
            deadline: Deadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn execute(
        &self,
        input: GetTrendingInput,
    ) -> Result<Vec<TrendingSong>, AnalyticsQueryError> {
        self.deadline.run(self.run(input)).await
    }

    async fn run(&self, input: GetTrendingInput) -> Result<Vec<TrendingSong>, AnalyticsQueryError> {
        let rows = self
            .trending
            .list_top_trending(&input.room_id, input.limit)
            .await?;

        let video_ids: Vec<String> = rows.iter().map(|r| r.video_id.clone()).collect();
        let mut details =
            load_song_details(self.queue_repo.as_ref(), &input.room_id, &video_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| TrendingSong {
                details: details.remove(&row.video_id),
                video_id: row.video_id,
                trending_score: row.trending_score,
                recent_upvotes: row.recent_upvotes,
                recent_plays: row.recent_plays,
                last_updated: row.last_updated,
            })
            .collect())
    }
}
