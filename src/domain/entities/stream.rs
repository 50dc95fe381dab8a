use serde::{Deserialize, Serialize};

/// One submission of a song into a room's queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: String,
    /// Room the song was queued in (the room owner's user id)
    pub room_id: String,
    pub added_by: String,
    pub url: String,
    /// External video id, shared by every entry of the same song
    pub video_id: String,
    pub title: String,
    pub small_img: String,
    pub big_img: String,
    pub created_at: i64,
    pub played: bool,
    pub played_at: Option<i64>,
}

impl QueueEntry {
    /// Check if the given user submitted this entry
    pub fn is_added_by(&self, user_id: &str) -> bool {
        self.added_by == user_id
    }

    /// Check if the given user owns the room this entry belongs to
    pub fn is_room_owner(&self, user_id: &str) -> bool {
        self.room_id == user_id
    }

    /// Mark the entry as selected for playback
    pub fn mark_played(&mut self, now: i64) {
        self.played = true;
        self.played_at = Some(now);
    }
}

/// Queued entry with its vote tally, as seen by one viewer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedEntry {
    #[serde(flatten)]
    pub entry: QueueEntry,
    pub upvotes: i64,
    pub have_upvoted: bool,
}

/// Count of rows per song
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongCount {
    pub video_id: String,
    pub count: i64,
}
