use serde::Serialize;

/// Signed change to a user's room counters. Applying it never drives a counter below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDelta {
    pub added: i64,
    pub likes_got: i64,
    pub likes_given: i64,
}

impl StatsDelta {
    pub fn song_added() -> Self {
        Self {
            added: 1,
            ..Default::default()
        }
    }

    pub fn like_received() -> Self {
        Self {
            likes_got: 1,
            ..Default::default()
        }
    }

    pub fn like_given() -> Self {
        Self {
            likes_given: 1,
            ..Default::default()
        }
    }

    pub fn negate(self) -> Self {
        Self {
            added: -self.added,
            likes_got: -self.likes_got,
            likes_given: -self.likes_given,
        }
    }

    /// Counter values after applying to `(added, likes_got, likes_given)`
    pub fn apply_to(&self, current: (i64, i64, i64)) -> (i64, i64, i64) {
        (
            (current.0 + self.added).max(0),
            (current.1 + self.likes_got).max(0),
            (current.2 + self.likes_given).max(0),
        )
    }
}
