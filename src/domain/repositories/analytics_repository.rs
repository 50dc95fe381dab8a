use async_trait::async_trait;

use crate::domain::entities::{RoomSongTrending, UserRoomStats};
use crate::domain::repositories::RepositoryError;
use crate::domain::services::{StatsDelta, TrendingEvent};

/// Derived analytics rows.
///
/// Every mutation is a single atomic upsert on its row; implementations
/// must not read a counter and write it back in separate statements.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    // ========== Trending ==========

    /// Apply an event to the (room, song) trending row, creating it if absent
    async fn apply_trending_event(
        &self,
        room_id: &str,
        video_id: &str,
        event: TrendingEvent,
        now: i64,
    ) -> Result<RoomSongTrending, RepositoryError>;

    /// Find trending row
    async fn find_trending(
        &self,
        room_id: &str,
        video_id: &str,
    ) -> Result<Option<RoomSongTrending>, RepositoryError>;

    /// Rows ordered by score desc then last update desc.
    /// With `min_score_exclusive`, only rows scoring strictly above it.
    async fn top_trending(
        &self,
        room_id: &str,
        limit: u32,
        min_score_exclusive: Option<i64>,
    ) -> Result<Vec<RoomSongTrending>, RepositoryError>;

    /// Every trending row of a room, ordered by song
    async fn list_room_trending(
        &self,
        room_id: &str,
    ) -> Result<Vec<RoomSongTrending>, RepositoryError>;

    // ========== User stats ==========

    /// Apply a delta to the (user, room) stats row, creating it if absent
    async fn apply_stats_delta(
        &self,
        user_id: &str,
        room_id: &str,
        delta: StatsDelta,
        now: i64,
    ) -> Result<UserRoomStats, RepositoryError>;

    /// Find stats row
    async fn find_stats(
        &self,
        user_id: &str,
        room_id: &str,
    ) -> Result<Option<UserRoomStats>, RepositoryError>;

    /// Every stats row of a room, ordered by user
    async fn list_room_stats(&self, room_id: &str) -> Result<Vec<UserRoomStats>, RepositoryError>;

    // ========== Backfill ==========

    /// Replace all derived rows of a room in one transaction
    async fn replace_room_analytics(
        &self,
        room_id: &str,
        stats: &[UserRoomStats],
        trending: &[RoomSongTrending],
    ) -> Result<(), RepositoryError>;
}
