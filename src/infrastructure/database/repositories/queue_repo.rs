use async_trait::async_trait;
use sqlx::SqlitePool;

use super::db_error;
use crate::domain::entities::{QueueEntry, QueuedEntry, RoomVote, SongCount, Vote};
use crate::domain::repositories::{QueueRepository, RepositoryError};
use crate::domain::services::{check_queue_capacity, check_recent_adds};
use crate::domain::value_objects::{AdmissionPolicy, RejectionReason};

/// SQLite implementation of QueueRepository
pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> QueueEntry {
        use sqlx::Row;

        QueueEntry {
            id: row.get("id"),
            room_id: row.get("room_id"),
            added_by: row.get("added_by"),
            url: row.get("url"),
            video_id: row.get("video_id"),
            title: row.get("title"),
            small_img: row.get("small_img"),
            big_img: row.get("big_img"),
            created_at: row.get("created_at"),
            played: row.get::<i64, _>("played") != 0,
            played_at: row.get("played_at"),
        }
    }

    fn row_to_song_count(row: &sqlx::sqlite::SqliteRow) -> SongCount {
        use sqlx::Row;

        SongCount {
            video_id: row.get("video_id"),
            count: row.get("count"),
        }
    }
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    // ========== Entries ==========

    async fn find_entry(&self, id: &str) -> Result<Option<QueueEntry>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM streams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.as_ref().map(Self::row_to_entry))
    }

    async fn insert_entry(&self, entry: &QueueEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO streams (id, room_id, added_by, url, video_id, title, small_img, big_img, created_at, played, played_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.room_id)
        .bind(&entry.added_by)
        .bind(&entry.url)
        .bind(&entry.video_id)
        .bind(&entry.title)
        .bind(&entry.small_img)
        .bind(&entry.big_img)
        .bind(entry.created_at)
        .bind(entry.played as i64)
        .bind(entry.played_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::AlreadyExists(format!("stream {}", entry.id))
            }
            other => db_error(other),
        })?;

        Ok(())
    }

    async fn insert_if_admitted(
        &self,
        entry: &QueueEntry,
        policy: &AdmissionPolicy,
    ) -> Result<Result<(), RejectionReason>, RepositoryError> {
        let now = entry.created_at;
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // Admission rules and insert in one statement: the write lock is held
        // from the checks to the insert.
        let result = sqlx::query(
            r#"
            INSERT INTO streams (id, room_id, added_by, url, video_id, title, small_img, big_img, created_at, played, played_at)
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, NULL
            WHERE NOT EXISTS (
                SELECT 1 FROM streams WHERE room_id = ?2 AND video_id = ?5 AND created_at >= ?10
            )
            AND (?3 = ?2 OR (
                (SELECT COUNT(*) FROM streams WHERE room_id = ?2 AND added_by = ?3 AND created_at >= ?11) < ?12
                AND (SELECT COUNT(*) FROM streams WHERE room_id = ?2 AND added_by = ?3 AND created_at >= ?13) < ?14
            ))
            AND (SELECT COUNT(*) FROM streams WHERE room_id = ?2 AND played = 0) < ?15
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.room_id)
        .bind(&entry.added_by)
        .bind(&entry.url)
        .bind(&entry.video_id)
        .bind(&entry.title)
        .bind(&entry.small_img)
        .bind(&entry.big_img)
        .bind(now)
        .bind(now - policy.duplicate_window_secs)
        .bind(now - policy.short_limit.window_secs)
        .bind(policy.short_limit.max_adds as i64)
        .bind(now - policy.long_limit.window_secs)
        .bind(policy.long_limit.max_adds as i64)
        .bind(policy.max_queue_len as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::AlreadyExists(format!("stream {}", entry.id))
            }
            other => db_error(other),
        })?;

        if result.rows_affected() > 0 {
            tx.commit().await.map_err(db_error)?;
            return Ok(Ok(()));
        }

        // Rejected: name the rule against the same state the insert saw
        let rows = sqlx::query("SELECT * FROM streams WHERE room_id = ? AND created_at >= ?")
            .bind(&entry.room_id)
            .bind(now - policy.lookback_secs())
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error)?;
        let recent: Vec<QueueEntry> = rows.iter().map(Self::row_to_entry).collect();

        let unplayed: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM streams WHERE room_id = ? AND played = 0")
                .bind(&entry.room_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_error)?;

        tx.rollback().await.map_err(db_error)?;

        let verdict = check_recent_adds(
            policy,
            now,
            &entry.room_id,
            &entry.added_by,
            &entry.video_id,
            &recent,
        )
        .and_then(|()| check_queue_capacity(policy, unplayed as u32));

        match verdict {
            Err(reason) => Ok(Err(reason)),
            Ok(()) => Err(RepositoryError::Database(format!(
                "admission of stream {} rejected without a matching rule",
                entry.id
            ))),
        }
    }

    async fn find_added_since(
        &self,
        room_id: &str,
        since: i64,
    ) -> Result<Vec<QueueEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM streams WHERE room_id = ? AND created_at >= ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(room_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_entry).collect())
    }

    async fn count_unplayed(&self, room_id: &str) -> Result<u32, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM streams WHERE room_id = ? AND played = 0")
                .bind(room_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(count as u32)
    }

    async fn list_queue(
        &self,
        room_id: &str,
        viewer_id: &str,
    ) -> Result<Vec<QueuedEntry>, RepositoryError> {
        use sqlx::Row;

        let rows = sqlx::query(
            r#"
            SELECT s.*,
                   COUNT(u.id) AS upvote_count,
                   MAX(CASE WHEN u.user_id = ?2 THEN 1 ELSE 0 END) AS viewer_upvoted
            FROM streams s
            LEFT JOIN upvotes u ON u.stream_id = s.id
            WHERE s.room_id = ?1 AND s.played = 0
            GROUP BY s.id
            ORDER BY upvote_count DESC, s.created_at ASC, s.rowid ASC
            "#,
        )
        .bind(room_id)
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .iter()
            .map(|row| QueuedEntry {
                entry: Self::row_to_entry(row),
                upvotes: row.get("upvote_count"),
                have_upvoted: row.get::<i64, _>("viewer_upvoted") != 0,
            })
            .collect())
    }

    async fn delete_entry(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // Played entries are history: every statement matches unplayed rows only
        sqlx::query(
            "DELETE FROM upvotes WHERE stream_id IN (SELECT id FROM streams WHERE id = ? AND played = 0)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        sqlx::query(
            "UPDATE current_streams SET stream_id = NULL WHERE stream_id IN (SELECT id FROM streams WHERE id = ? AND played = 0)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        let result = sqlx::query("DELETE FROM streams WHERE id = ? AND played = 0")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_unplayed(&self, room_id: &str) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            "DELETE FROM upvotes WHERE stream_id IN (SELECT id FROM streams WHERE room_id = ? AND played = 0)",
        )
        .bind(room_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        let result = sqlx::query("DELETE FROM streams WHERE room_id = ? AND played = 0")
            .bind(room_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        Ok(result.rows_affected())
    }

    // ========== Playback ==========

    async fn find_current(&self, room_id: &str) -> Result<Option<QueueEntry>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT s.* FROM current_streams c
            JOIN streams s ON s.id = c.stream_id
            WHERE c.room_id = ?
            "#,
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.as_ref().map(Self::row_to_entry))
    }

    async fn advance(
        &self,
        room_id: &str,
        now: i64,
    ) -> Result<Option<QueueEntry>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // Selection and marking in one statement: two concurrent advances
        // can never mark the same entry.
        let row = sqlx::query(
            r#"
            UPDATE streams SET played = 1, played_at = ?2
            WHERE played = 0 AND id = (
                SELECT s.id FROM streams s
                LEFT JOIN upvotes u ON u.stream_id = s.id
                WHERE s.room_id = ?1 AND s.played = 0
                GROUP BY s.id
                ORDER BY COUNT(u.id) DESC, s.created_at ASC, s.rowid ASC
                LIMIT 1
            )
            RETURNING *
            "#,
        )
        .bind(room_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;

        let next = row.as_ref().map(Self::row_to_entry);

        sqlx::query(
            r#"
            INSERT INTO current_streams (room_id, stream_id, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(room_id) DO UPDATE SET stream_id = excluded.stream_id, updated_at = excluded.updated_at
            "#,
        )
        .bind(room_id)
        .bind(next.as_ref().map(|e| e.id.as_str()))
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        Ok(next)
    }

    // ========== Votes ==========

    async fn insert_vote(&self, vote: &Vote) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO upvotes (user_id, stream_id, created_at) VALUES (?, ?, ?)")
            .bind(&vote.user_id)
            .bind(&vote.stream_id)
            .bind(vote.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    RepositoryError::AlreadyExists(format!(
                        "vote by {} on {}",
                        vote.user_id, vote.stream_id
                    ))
                }
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    RepositoryError::NotFound(format!("stream {}", vote.stream_id))
                }
                other => db_error(other),
            })?;

        Ok(())
    }

    async fn delete_vote(&self, user_id: &str, stream_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM upvotes WHERE user_id = ? AND stream_id = ?")
            .bind(user_id)
            .bind(stream_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    // ========== Analytics reads ==========

    async fn unplayed_video_ids(&self, room_id: &str) -> Result<Vec<String>, RepositoryError> {
        sqlx::query_scalar(
            "SELECT DISTINCT video_id FROM streams WHERE room_id = ? AND played = 0 ORDER BY video_id",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn find_played_since(
        &self,
        room_id: &str,
        since: i64,
    ) -> Result<Vec<QueueEntry>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM streams
            WHERE room_id = ? AND played = 1 AND played_at IS NOT NULL AND played_at >= ?
            ORDER BY played_at DESC, rowid DESC
            "#,
        )
        .bind(room_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_entry).collect())
    }

    async fn count_votes_received_by_song(
        &self,
        room_id: &str,
        owner_id: &str,
    ) -> Result<Vec<SongCount>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT s.video_id AS video_id, COUNT(u.id) AS count
            FROM upvotes u
            JOIN streams s ON s.id = u.stream_id
            WHERE s.room_id = ? AND s.added_by = ?
            GROUP BY s.video_id
            ORDER BY count DESC, s.video_id ASC
            "#,
        )
        .bind(room_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_song_count).collect())
    }

    async fn count_adds_by_song(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Vec<SongCount>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT video_id, COUNT(*) AS count
            FROM streams
            WHERE room_id = ? AND added_by = ?
            GROUP BY video_id
            ORDER BY count DESC, video_id ASC
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_song_count).collect())
    }

    async fn find_add_times(
        &self,
        room_id: &str,
        user_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<i64>, RepositoryError> {
        sqlx::query_scalar(
            r#"
            SELECT created_at FROM streams
            WHERE room_id = ? AND added_by = ? AND created_at >= ? AND created_at < ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn find_latest_by_video_ids(
        &self,
        room_id: &str,
        video_ids: &[String],
    ) -> Result<Vec<QueueEntry>, RepositoryError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<&str> = video_ids.iter().map(|_| "?").collect();
        let query = format!(
            "SELECT * FROM streams WHERE room_id = ? AND video_id IN ({}) ORDER BY created_at DESC, rowid DESC",
            placeholders.join(", ")
        );

        let mut query_builder = sqlx::query(&query).bind(room_id);
        for id in video_ids {
            query_builder = query_builder.bind(id);
        }

        let rows = query_builder
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let mut seen = std::collections::HashSet::new();
        Ok(rows
            .iter()
            .map(Self::row_to_entry)
            .filter(|e| seen.insert(e.video_id.clone()))
            .collect())
    }

    // ========== Backfill ==========

    async fn list_room_entries(&self, room_id: &str) -> Result<Vec<QueueEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM streams WHERE room_id = ? ORDER BY created_at ASC, rowid ASC")
            .bind(room_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_entry).collect())
    }

    async fn list_room_votes(&self, room_id: &str) -> Result<Vec<RoomVote>, RepositoryError> {
        use sqlx::Row;

        let rows = sqlx::query(
            r#"
            SELECT u.user_id AS voter_id, u.stream_id AS stream_id, s.video_id AS video_id,
                   s.added_by AS owner_id, u.created_at AS created_at
            FROM upvotes u
            JOIN streams s ON s.id = u.stream_id
            WHERE s.room_id = ?
            ORDER BY u.id ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .iter()
            .map(|row| RoomVote {
                voter_id: row.get("voter_id"),
                stream_id: row.get("stream_id"),
                video_id: row.get("video_id"),
                owner_id: row.get("owner_id"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn list_room_ids(&self) -> Result<Vec<String>, RepositoryError> {
        sqlx::query_scalar("SELECT DISTINCT room_id FROM streams ORDER BY room_id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }
}
