use serde::{Deserialize, Serialize};

/// At most `max_adds` songs per `window_secs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub max_adds: u32,
    pub window_secs: i64,
}

/// Admission control thresholds for song adds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionPolicy {
    /// Maximum number of unplayed entries in a room
    pub max_queue_len: u32,
    /// Same song may not be re-added within this window
    pub duplicate_window_secs: i64,
    pub short_limit: RateLimit,
    pub long_limit: RateLimit,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            max_queue_len: 20,
            duplicate_window_secs: 10 * 60,
            short_limit: RateLimit {
                max_adds: 2,
                window_secs: 2 * 60,
            },
            long_limit: RateLimit {
                max_adds: 5,
                window_secs: 10 * 60,
            },
        }
    }
}

impl AdmissionPolicy {
    /// How far back recent adds must be loaded to evaluate every rule
    pub fn lookback_secs(&self) -> i64 {
        self.duplicate_window_secs
            .max(self.short_limit.window_secs)
            .max(self.long_limit.window_secs)
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_queue_len == 0 {
            return Err("Queue length must be at least 1");
        }
        if self.duplicate_window_secs < 0
            || self.short_limit.window_secs < 0
            || self.long_limit.window_secs < 0
        {
            return Err("Admission windows cannot be negative");
        }
        Ok(())
    }
}
