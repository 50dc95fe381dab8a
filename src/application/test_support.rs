//! Shared fixtures for use case tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::{QueueEntry, RoomSongTrending, UserRoomStats};
use crate::domain::repositories::{AnalyticsRepository, RepositoryError};
use crate::domain::services::{StatsDelta, TrendingEvent};
use crate::infrastructure::database::connect;
use crate::infrastructure::database::repositories::{
    SqliteAnalyticsRepository, SqliteQueueRepository,
};

pub async fn repos() -> (Arc<SqliteQueueRepository>, Arc<SqliteAnalyticsRepository>) {
    let pool = connect("sqlite::memory:").await.unwrap();
    (
        Arc::new(SqliteQueueRepository::new(pool.clone())),
        Arc::new(SqliteAnalyticsRepository::new(pool)),
    )
}

pub async fn analytics_repo() -> Arc<SqliteAnalyticsRepository> {
    repos().await.1
}

pub fn entry(id: &str, room: &str, by: &str, video: &str, created_at: i64) -> QueueEntry {
    QueueEntry {
        id: id.to_string(),
        room_id: room.to_string(),
        added_by: by.to_string(),
        url: format!("https://youtu.be/{}", video),
        video_id: video.to_string(),
        title: format!("Song {}", video),
        small_img: "small".to_string(),
        big_img: "big".to_string(),
        created_at,
        played: false,
        played_at: None,
    }
}

/// Analytics store that is always down
pub struct FailingAnalyticsRepository;

fn down() -> RepositoryError {
    RepositoryError::Database("analytics store unavailable".to_string())
}

#[async_trait]
impl AnalyticsRepository for FailingAnalyticsRepository {
    async fn apply_trending_event(
        &self,
        _room_id: &str,
        _video_id: &str,
        _event: TrendingEvent,
        _now: i64,
    ) -> Result<RoomSongTrending, RepositoryError> {
        Err(down())
    }

    async fn find_trending(
        &self,
        _room_id: &str,
        _video_id: &str,
    ) -> Result<Option<RoomSongTrending>, RepositoryError> {
        Err(down())
    }

    async fn top_trending(
        &self,
        _room_id: &str,
        _limit: u32,
        _min_score_exclusive: Option<i64>,
    ) -> Result<Vec<RoomSongTrending>, RepositoryError> {
        Err(down())
    }

    async fn list_room_trending(
        &self,
        _room_id: &str,
    ) -> Result<Vec<RoomSongTrending>, RepositoryError> {
        Err(down())
    }

    async fn apply_stats_delta(
        &self,
        _user_id: &str,
        _room_id: &str,
        _delta: StatsDelta,
        _now: i64,
    ) -> Result<UserRoomStats, RepositoryError> {
        Err(down())
    }

    async fn find_stats(
        &self,
        _user_id: &str,
        _room_id: &str,
    ) -> Result<Option<UserRoomStats>, RepositoryError> {
        Err(down())
    }

    async fn list_room_stats(&self, _room_id: &str) -> Result<Vec<UserRoomStats>, RepositoryError> {
        Err(down())
    }

    async fn replace_room_analytics(
        &self,
        _room_id: &str,
        _stats: &[UserRoomStats],
        _trending: &[RoomSongTrending],
    ) -> Result<(), RepositoryError> {
        Err(down())
    }
}

/// Analytics store that answers every write only after `delay`
pub struct SlowAnalyticsRepository {
    inner: Arc<SqliteAnalyticsRepository>,
    delay: Duration,
}

impl SlowAnalyticsRepository {
    pub fn new(inner: Arc<SqliteAnalyticsRepository>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl AnalyticsRepository for SlowAnalyticsRepository {
    async fn apply_trending_event(
        &self,
        room_id: &str,
        video_id: &str,
        event: TrendingEvent,
        now: i64,
    ) -> Result<RoomSongTrending, RepositoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.apply_trending_event(room_id, video_id, event, now).await
    }

    async fn find_trending(
        &self,
        room_id: &str,
        video_id: &str,
    ) -> Result<Option<RoomSongTrending>, RepositoryError> {
        self.inner.find_trending(room_id, video_id).await
    }

    async fn top_trending(
        &self,
        room_id: &str,
        limit: u32,
        min_score_exclusive: Option<i64>,
    ) -> Result<Vec<RoomSongTrending>, RepositoryError> {
        self.inner.top_trending(room_id, limit, min_score_exclusive).await
    }

    async fn list_room_trending(
        &self,
        room_id: &str,
    ) -> Result<Vec<RoomSongTrending>, RepositoryError> {
        self.inner.list_room_trending(room_id).await
    }

    async fn apply_stats_delta(
        &self,
        user_id: &str,
        room_id: &str,
        delta: StatsDelta,
        now: i64,
    ) -> Result<UserRoomStats, RepositoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.apply_stats_delta(user_id, room_id, delta, now).await
    }

    async fn find_stats(
        &self,
        user_id: &str,
        room_id: &str,
    ) -> Result<Option<UserRoomStats>, RepositoryError> {
        self.inner.find_stats(user_id, room_id).await
    }

    async fn list_room_stats(&self, room_id: &str) -> Result<Vec<UserRoomStats>, RepositoryError> {
        self.inner.list_room_stats(room_id).await
    }

    async fn replace_room_analytics(
        &self,
        room_id: &str,
        stats: &[UserRoomStats],
        trending: &[RoomSongTrending],
    ) -> Result<(), RepositoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.replace_room_analytics(room_id, stats, trending).await
    }
}
