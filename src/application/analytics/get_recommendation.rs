use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::application::analytics::{load_song_details, AnalyticsQueryError, SongDetails};
use crate::application::Deadline;
use crate::domain::repositories::{AnalyticsRepository, QueueRepository};
use crate::domain::services::{
    rank_candidates, RecommendationSignals, RecommendationWeights, ScoreParts,
};
use crate::infrastructure::config::AnalyticsWindows;

pub const DEFAULT_RECOMMENDATION_LIMIT: u32 = 5;
pub const MAX_RECOMMENDATION_LIMIT: u32 = 25;

/// Trending rows considered as candidates
const CANDIDATE_POOL: u32 = 500;

pub struct GetRecommendationInput {
    pub room_id: String,
    pub user_id: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedSong {
    pub video_id: String,
    pub score: f64,
    pub parts: ScoreParts,
    #[serde(flatten)]
    pub details: Option<SongDetails>,
}

/// Ranked "what to add next" list for a user in a room. The first element is the single best.
pub struct GetRecommendation<Q: QueueRepository, A: AnalyticsRepository> {
    queue_repo: Arc<Q>,
    analytics_repo: Arc<A>,
    windows: AnalyticsWindows,
    weights: RecommendationWeights,
    deadline: Deadline,
}

impl<Q: QueueRepository, A: AnalyticsRepository> GetRecommendation<Q, A> {
    pub fn new(queue_repo: Arc<Q>, analytics_repo: Arc<A>, windows: AnalyticsWindows) -> Self {
        Self {
            queue_repo,
            analytics_repo,
            windows,
            weights: RecommendationWeights::default(),
            deadline: Deadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn execute(
        &self,
        input: GetRecommendationInput,
    ) -> Result<Vec<RecommendedSong>, AnalyticsQueryError> {
        self.deadline.run(self.run(input)).await
    }

    async fn run(
        &self,
        input: GetRecommendationInput,
    ) -> Result<Vec<RecommendedSong>, AnalyticsQueryError> {
        let now = chrono::Utc::now().timestamp();
        let limit = input
            .limit
            .unwrap_or(DEFAULT_RECOMMENDATION_LIMIT)
            .clamp(1, MAX_RECOMMENDATION_LIMIT) as usize;

        let signals = self.collect_signals(&input.room_id, &input.user_id, now).await?;
        let mut ranked = rank_candidates(&signals, &self.weights);
        ranked.truncate(limit);

        tracing::debug!(
            "Recommendation for {} in {}: {} candidates, {} excluded",
            input.user_id,
            input.room_id,
            ranked.len(),
            signals.excluded.len()
        );

        let video_ids: Vec<String> = ranked.iter().map(|s| s.video_id.clone()).collect();
        let mut details =
            load_song_details(self.queue_repo.as_ref(), &input.room_id, &video_ids).await?;

        Ok(ranked
            .into_iter()
            .map(|song| RecommendedSong {
                details: details.remove(&song.video_id),
                video_id: song.video_id,
                score: song.score,
                parts: song.parts,
            })
            .collect())
    }

    async fn collect_signals(
        &self,
        room_id: &str,
        user_id: &str,
        now: i64,
    ) -> Result<RecommendationSignals, AnalyticsQueryError> {
        let mut excluded: HashSet<String> = self
            .queue_repo
            .unplayed_video_ids(room_id)
            .await?
            .into_iter()
            .collect();

        let recently_played = self
            .queue_repo
            .find_played_since(room_id, now - self.windows.recently_played_secs)
            .await?;
        excluded.extend(recently_played.into_iter().map(|e| e.video_id));

        let room_scores = self
            .analytics_repo
            .top_trending(room_id, CANDIDATE_POOL, None)
            .await?
            .into_iter()
            .map(|row| (row.video_id, row.trending_score))
            .collect();

        let user_success = self
            .queue_repo
            .count_votes_received_by_song(room_id, user_id)
            .await?
            .into_iter()
            .map(|c| (c.video_id, c.count))
            .collect();

        let mut time_scores: HashMap<String, i64> = HashMap::new();
        for entry in self
            .queue_repo
            .find_played_since(room_id, now - self.windows.time_similarity_secs)
            .await?
        {
            *time_scores.entry(entry.video_id).or_insert(0) += 1;
        }

        Ok(RecommendationSignals {
            excluded,
            room_scores,
            user_success,
            time_scores,
        })
    }
}
