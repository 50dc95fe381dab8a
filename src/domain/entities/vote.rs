use serde::{Deserialize, Serialize};

/// An upvote on a queue entry. At most one per (user, stream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: String,
    pub stream_id: String,
    pub created_at: i64,
}

impl Vote {
    pub fn new(user_id: String, stream_id: String) -> Self {
        Self {
            user_id,
            stream_id,
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Vote joined with the entry it was cast on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomVote {
    pub voter_id: String,
    pub stream_id: String,
    pub video_id: String,
    /// Submitter of the voted entry
    pub owner_id: String,
    pub created_at: i64,
}
