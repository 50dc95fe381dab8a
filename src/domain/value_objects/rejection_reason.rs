use std::fmt;

use serde::Serialize;

/// Why a song add was refused by admission control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    DuplicateSong,
    RateLimitShort,
    RateLimitLong,
    QueueFull,
}

impl RejectionReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::DuplicateSong => "DUPLICATE_SONG",
            RejectionReason::RateLimitShort => "RATE_LIMIT_SHORT",
            RejectionReason::RateLimitLong => "RATE_LIMIT_LONG",
            RejectionReason::QueueFull => "QUEUE_FULL",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::DuplicateSong => "This song was already added recently",
            RejectionReason::RateLimitShort => "Rate limit exceeded: too many songs in a short time",
            RejectionReason::RateLimitLong => "Rate limit exceeded: too many songs in the last minutes",
            RejectionReason::QueueFull => "Queue is full",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for RejectionReason {}
