use serde::{Deserialize, Serialize};

use crate::domain::services::trending_score;

/// Per (room, song) trending counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSongTrending {
    pub room_id: String,
    pub video_id: String,
    pub recent_upvotes: i64,
    pub recent_plays: i64,
    pub trending_score: i64,
    pub last_updated: i64,
}

impl RoomSongTrending {
    /// Build a row whose score is derived from its counters
    pub fn new(
        room_id: &str,
        video_id: &str,
        recent_upvotes: i64,
        recent_plays: i64,
        now: i64,
    ) -> Self {
        Self {
            room_id: room_id.to_string(),
            video_id: video_id.to_string(),
            recent_upvotes,
            recent_plays,
            trending_score: trending_score(recent_upvotes, recent_plays),
            last_updated: now,
        }
    }

    /// Score as defined by the counters alone (ignores any add-time bump)
    pub fn formula_score(&self) -> i64 {
        trending_score(self.recent_upvotes, self.recent_plays)
    }
}
