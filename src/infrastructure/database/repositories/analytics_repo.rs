use async_trait::async_trait;
use sqlx::SqlitePool;

use super::db_error;
use crate::domain::entities::{RoomSongTrending, UserRoomStats};
use crate::domain::repositories::{AnalyticsRepository, RepositoryError};
use crate::domain::services::{StatsDelta, TrendingEvent, ADD_BUMP, PLAY_WEIGHT, UPVOTE_WEIGHT};

/// SQLite implementation of AnalyticsRepository.
///
/// Counter updates are `INSERT .. ON CONFLICT DO UPDATE .. RETURNING`
/// statements, so concurrent events on the same row never lose an update.
pub struct SqliteAnalyticsRepository {
    pool: SqlitePool,
}

impl SqliteAnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_trending(row: &sqlx::sqlite::SqliteRow) -> RoomSongTrending {
        use sqlx::Row;

        RoomSongTrending {
            room_id: row.get("room_id"),
            video_id: row.get("video_id"),
            recent_upvotes: row.get("recent_upvotes"),
            recent_plays: row.get("recent_plays"),
            trending_score: row.get("trending_score"),
            last_updated: row.get("last_updated"),
        }
    }

    fn row_to_stats(row: &sqlx::sqlite::SqliteRow) -> UserRoomStats {
        use sqlx::Row;

        UserRoomStats {
            user_id: row.get("user_id"),
            room_id: row.get("room_id"),
            total_added: row.get("total_added"),
            total_likes_got: row.get("total_likes_got"),
            total_likes_given: row.get("total_likes_given"),
            last_updated: row.get("last_updated"),
        }
    }

    /// SET clause of the trending upsert. Right-hand sides see the
    /// pre-update row, mirroring `TrendingEvent::apply`.
    fn trending_update_clause(event: TrendingEvent) -> String {
        let score = |upvotes: &str, plays: &str| {
            format!(
                "({}) * {} + ({}) * {}",
                upvotes, UPVOTE_WEIGHT, plays, PLAY_WEIGHT
            )
        };

        match event {
            TrendingEvent::Upvote => format!(
                "recent_upvotes = recent_upvotes + 1, trending_score = {}",
                score("recent_upvotes + 1", "recent_plays")
            ),
            TrendingEvent::Downvote => format!(
                "recent_upvotes = MAX(recent_upvotes - 1, 0), trending_score = {}",
                score("MAX(recent_upvotes - 1, 0)", "recent_plays")
            ),
            TrendingEvent::Play => format!(
                "recent_plays = recent_plays + 1, trending_score = {}",
                score("recent_upvotes", "recent_plays + 1")
            ),
            TrendingEvent::Add => format!("trending_score = trending_score + {}", ADD_BUMP),
        }
    }
}

#[async_trait]
impl AnalyticsRepository for SqliteAnalyticsRepository {
    // ========== Trending ==========

    async fn apply_trending_event(
        &self,
        room_id: &str,
        video_id: &str,
        event: TrendingEvent,
        now: i64,
    ) -> Result<RoomSongTrending, RepositoryError> {
        let initial = event.apply(None);
        let query = format!(
            r#"
            INSERT INTO room_song_trending (room_id, video_id, recent_upvotes, recent_plays, trending_score, last_updated)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(room_id, video_id) DO UPDATE SET
                {},
                last_updated = excluded.last_updated
            RETURNING *
            "#,
            Self::trending_update_clause(event)
        );

        let row = sqlx::query(&query)
            .bind(room_id)
            .bind(video_id)
            .bind(initial.recent_upvotes)
            .bind(initial.recent_plays)
            .bind(initial.trending_score)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(Self::row_to_trending(&row))
    }

    async fn find_trending(
        &self,
        room_id: &str,
        video_id: &str,
    ) -> Result<Option<RoomSongTrending>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM room_song_trending WHERE room_id = ? AND video_id = ?")
            .bind(room_id)
            .bind(video_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.as_ref().map(Self::row_to_trending))
    }

    async fn top_trending(
        &self,
        room_id: &str,
        limit: u32,
        min_score_exclusive: Option<i64>,
    ) -> Result<Vec<RoomSongTrending>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM room_song_trending
            WHERE room_id = ?1 AND (?2 IS NULL OR trending_score > ?2)
            ORDER BY trending_score DESC, last_updated DESC, video_id ASC
            LIMIT ?3
            "#,
        )
        .bind(room_id)
        .bind(min_score_exclusive)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_trending).collect())
    }

    async fn list_room_trending(
        &self,
        room_id: &str,
    ) -> Result<Vec<RoomSongTrending>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM room_song_trending WHERE room_id = ? ORDER BY video_id")
            .bind(room_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_trending).collect())
    }

    // ========== User stats ==========

    async fn apply_stats_delta(
        &self,
        user_id: &str,
        room_id: &str,
        delta: StatsDelta,
        now: i64,
    ) -> Result<UserRoomStats, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO user_room_stats (user_id, room_id, total_added, total_likes_got, total_likes_given, last_updated)
            VALUES (?1, ?2, MAX(?3, 0), MAX(?4, 0), MAX(?5, 0), ?6)
            ON CONFLICT(user_id, room_id) DO UPDATE SET
                total_added = MAX(total_added + ?3, 0),
                total_likes_got = MAX(total_likes_got + ?4, 0),
                total_likes_given = MAX(total_likes_given + ?5, 0),
                last_updated = ?6
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(room_id)
        .bind(delta.added)
        .bind(delta.likes_got)
        .bind(delta.likes_given)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(Self::row_to_stats(&row))
    }

    async fn find_stats(
        &self,
        user_id: &str,
        room_id: &str,
    ) -> Result<Option<UserRoomStats>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_room_stats WHERE user_id = ? AND room_id = ?")
            .bind(user_id)
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.as_ref().map(Self::row_to_stats))
    }

    async fn list_room_stats(&self, room_id: &str) -> Result<Vec<UserRoomStats>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM user_room_stats WHERE room_id = ? ORDER BY user_id")
            .bind(room_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_stats).collect())
    }

    // ========== Backfill ==========

    async fn replace_room_analytics(
        &self,
        room_id: &str,
        stats: &[UserRoomStats],
        trending: &[RoomSongTrending],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM user_room_stats WHERE room_id = ?")
            .bind(room_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        sqlx::query("DELETE FROM room_song_trending WHERE room_id = ?")
            .bind(room_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        for s in stats {
            sqlx::query(
                r#"
                INSERT INTO user_room_stats (user_id, room_id, total_added, total_likes_got, total_likes_given, last_updated)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&s.user_id)
            .bind(room_id)
            .bind(s.total_added)
            .bind(s.total_likes_got)
            .bind(s.total_likes_given)
            .bind(s.last_updated)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        for t in trending {
            sqlx::query(
                r#"
                INSERT INTO room_song_trending (room_id, video_id, recent_upvotes, recent_plays, trending_score, last_updated)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(room_id)
            .bind(&t.video_id)
            .bind(t.recent_upvotes)
            .bind(t.recent_plays)
            .bind(t.trending_score)
            .bind(t.last_updated)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;

        tracing::debug!(
            "Replaced analytics for room {}: {} stats rows, {} trending rows",
            room_id,
            stats.len(),
            trending.len()
        );

        Ok(())
    }
}
