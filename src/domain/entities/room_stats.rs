use serde::{Deserialize, Serialize};

/// Per (user, room) activity counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRoomStats {
    pub user_id: String,
    pub room_id: String,
    pub total_added: i64,
    pub total_likes_got: i64,
    pub total_likes_given: i64,
    pub last_updated: i64,
}

impl UserRoomStats {
    /// Zeroed row, used when a user has no activity in the room yet
    pub fn empty(user_id: &str, room_id: &str, now: i64) -> Self {
        Self {
            user_id: user_id.to_string(),
            room_id: room_id.to_string(),
            total_added: 0,
            total_likes_got: 0,
            total_likes_given: 0,
            last_updated: now,
        }
    }

    /// Average likes received per added song
    pub fn avg_likes(&self) -> f64 {
        if self.total_added > 0 {
            self.total_likes_got as f64 / self.total_added as f64
        } else {
            0.0
        }
    }
}

/// Read-side view of a user's stats in a room
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub room_id: String,
    pub total_added: i64,
    pub total_likes_got: i64,
    pub total_likes_given: i64,
    pub avg_likes: f64,
    pub last_updated: Option<i64>,
}

impl StatsSnapshot {
    pub fn from_stats(room_id: &str, stats: Option<&UserRoomStats>) -> Self {
        match stats {
            Some(s) => Self {
                room_id: room_id.to_string(),
                total_added: s.total_added,
                total_likes_got: s.total_likes_got,
                total_likes_given: s.total_likes_given,
                avg_likes: s.avg_likes(),
                last_updated: Some(s.last_updated),
            },
            None => Self {
                room_id: room_id.to_string(),
                total_added: 0,
                total_likes_got: 0,
                total_likes_given: 0,
                avg_likes: 0.0,
                last_updated: None,
            },
        }
    }
}
