use async_trait::async_trait;

use crate::domain::entities::{QueueEntry, QueuedEntry, RoomVote, SongCount, Vote};
use crate::domain::value_objects::{AdmissionPolicy, RejectionReason};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Deadline exceeded")]
    Timeout,
}

/// Queue entries, votes and the current selection of each room
#[async_trait]
pub trait QueueRepository: Send + Sync {
    // ========== Entries ==========

    /// Find entry by ID
    async fn find_entry(&self, id: &str) -> Result<Option<QueueEntry>, RepositoryError>;

    /// Insert a new entry
    async fn insert_entry(&self, entry: &QueueEntry) -> Result<(), RepositoryError>;

    /// Insert a new unplayed entry if the room still admits it under `policy`,
    /// taking `entry.created_at` as the current time.
    ///
    /// The admission check and the insert are atomic: concurrent adds to the
    /// same room can never both pass on the same state.
    async fn insert_if_admitted(
        &self,
        entry: &QueueEntry,
        policy: &AdmissionPolicy,
    ) -> Result<Result<(), RejectionReason>, RepositoryError>;

    /// Entries of a room created at or after `since`
    async fn find_added_since(
        &self,
        room_id: &str,
        since: i64,
    ) -> Result<Vec<QueueEntry>, RepositoryError>;

    /// Count unplayed entries in a room
    async fn count_unplayed(&self, room_id: &str) -> Result<u32, RepositoryError>;

    /// Unplayed entries ordered by votes desc then creation asc, with the viewer's vote state
    async fn list_queue(
        &self,
        room_id: &str,
        viewer_id: &str,
    ) -> Result<Vec<QueuedEntry>, RepositoryError>;

    /// Delete an unplayed entry and its votes. Returns false if no unplayed entry has this id.
    async fn delete_entry(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Delete every unplayed entry of a room
    async fn delete_unplayed(&self, room_id: &str) -> Result<u64, RepositoryError>;

    // ========== Playback ==========

    /// Currently selected entry of a room
    async fn find_current(&self, room_id: &str) -> Result<Option<QueueEntry>, RepositoryError>;

    /// Select the top unplayed entry, mark it played and point the room at it.
    /// Clears the selection and returns `None` when nothing is queued.
    async fn advance(&self, room_id: &str, now: i64)
        -> Result<Option<QueueEntry>, RepositoryError>;

    // ========== Votes ==========

    /// Insert a vote. Fails with `AlreadyExists` if the user already voted on the entry.
    async fn insert_vote(&self, vote: &Vote) -> Result<(), RepositoryError>;

    /// Delete a vote. Returns false if there was none.
    async fn delete_vote(&self, user_id: &str, stream_id: &str) -> Result<bool, RepositoryError>;

    // ========== Analytics reads ==========

    /// Distinct songs currently queued and unplayed
    async fn unplayed_video_ids(&self, room_id: &str) -> Result<Vec<String>, RepositoryError>;

    /// Entries played at or after `since`
    async fn find_played_since(
        &self,
        room_id: &str,
        since: i64,
    ) -> Result<Vec<QueueEntry>, RepositoryError>;

    /// Votes received on a user's submissions, grouped by song, count desc
    async fn count_votes_received_by_song(
        &self,
        room_id: &str,
        owner_id: &str,
    ) -> Result<Vec<SongCount>, RepositoryError>;

    /// A user's submissions grouped by song, count desc
    async fn count_adds_by_song(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Vec<SongCount>, RepositoryError>;

    /// Creation times of a user's submissions within `[start, end)`
    async fn find_add_times(
        &self,
        room_id: &str,
        user_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<i64>, RepositoryError>;

    /// Most recent entry of each given song in the room
    async fn find_latest_by_video_ids(
        &self,
        room_id: &str,
        video_ids: &[String],
    ) -> Result<Vec<QueueEntry>, RepositoryError>;

    // ========== Backfill ==========

    /// Every entry of a room
    async fn list_room_entries(&self, room_id: &str) -> Result<Vec<QueueEntry>, RepositoryError>;

    /// Every vote on entries of a room
    async fn list_room_votes(&self, room_id: &str) -> Result<Vec<RoomVote>, RepositoryError>;

    /// Every room that has at least one entry
    async fn list_room_ids(&self) -> Result<Vec<String>, RepositoryError>;
}
