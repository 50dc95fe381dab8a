use std::sync::Arc;

use crate::domain::entities::RoomSongTrending;
use crate::domain::repositories::{AnalyticsRepository, RepositoryError};
use crate::domain::services::TrendingEvent;

pub const DEFAULT_TRENDING_LIMIT: u32 = 10;
pub const MAX_TRENDING_LIMIT: u32 = 25;

/// Clamp a requested list size to [1, 25], defaulting to 10
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(DEFAULT_TRENDING_LIMIT)
        .clamp(1, MAX_TRENDING_LIMIT)
}

/// Keeps per (room, song) trending rows in step with votes, plays and adds
pub struct TrendingAggregator<A: AnalyticsRepository> {
    analytics_repo: Arc<A>,
}

impl<A: AnalyticsRepository> Clone for TrendingAggregator<A> {
    fn clone(&self) -> Self {
        Self {
            analytics_repo: self.analytics_repo.clone(),
        }
    }
}

impl<A: AnalyticsRepository> TrendingAggregator<A> {
    pub fn new(analytics_repo: Arc<A>) -> Self {
        Self { analytics_repo }
    }

    pub async fn on_upvote(
        &self,
        room_id: &str,
        video_id: &str,
    ) -> Result<RoomSongTrending, RepositoryError> {
        self.apply(room_id, video_id, TrendingEvent::Upvote).await
    }

    pub async fn on_downvote(
        &self,
        room_id: &str,
        video_id: &str,
    ) -> Result<RoomSongTrending, RepositoryError> {
        self.apply(room_id, video_id, TrendingEvent::Downvote).await
    }

    pub async fn on_play(
        &self,
        room_id: &str,
        video_id: &str,
    ) -> Result<RoomSongTrending, RepositoryError> {
        self.apply(room_id, video_id, TrendingEvent::Play).await
    }

    pub async fn on_add(
        &self,
        room_id: &str,
        video_id: &str,
    ) -> Result<RoomSongTrending, RepositoryError> {
        self.apply(room_id, video_id, TrendingEvent::Add).await
    }

    /// Songs scoring above zero, by score desc then last update desc
    pub async fn list_top_trending(
        &self,
        room_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<RoomSongTrending>, RepositoryError> {
        self.analytics_repo
            .top_trending(room_id, clamp_limit(limit), Some(0))
            .await
    }

    async fn apply(
        &self,
        room_id: &str,
        video_id: &str,
        event: TrendingEvent,
    ) -> Result<RoomSongTrending, RepositoryError> {
        let now = chrono::Utc::now().timestamp();
        let row = self
            .analytics_repo
            .apply_trending_event(room_id, video_id, event, now)
            .await?;

        tracing::debug!(
            "Trending {} for {}/{}: upvotes={} plays={} score={}",
            event.as_str(),
            room_id,
            video_id,
            row.recent_upvotes,
            row.recent_plays,
            row.trending_score
        );

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::analytics_repo;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(100)), 25);
        assert_eq!(clamp_limit(Some(7)), 7);
    }

    #[tokio::test]
    async fn test_add_upvote_downvote_drops_song_from_trending() {
        let trending = TrendingAggregator::new(analytics_repo().await);

        let row = trending.on_add("room", "x").await.unwrap();
        assert_eq!(row.trending_score, 1);

        let row = trending.on_upvote("room", "x").await.unwrap();
        assert_eq!((row.recent_upvotes, row.trending_score), (1, 2));
        assert_eq!(trending.list_top_trending("room", None).await.unwrap().len(), 1);

        let row = trending.on_downvote("room", "x").await.unwrap();
        assert_eq!((row.recent_upvotes, row.trending_score), (0, 0));
        assert!(trending.list_top_trending("room", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_play_counts_towards_score() {
        let trending = TrendingAggregator::new(analytics_repo().await);
        trending.on_upvote("room", "x").await.unwrap();
        let row = trending.on_play("room", "x").await.unwrap();
        assert_eq!(row.recent_plays, 1);
        assert_eq!(row.trending_score, row.formula_score());
        assert_eq!(row.trending_score, 3);
    }
}
