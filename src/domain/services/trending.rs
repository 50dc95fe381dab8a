//! Trending counters for a (room, song) pair.
//!
//! The score is always `recent_upvotes * 2 + recent_plays` after an event
//! that touches a counter. The add-time bump is the one exception: it adds
//! to the score without touching a counter and is overwritten by the next
//! counter event.

use serde::Serialize;

pub const UPVOTE_WEIGHT: i64 = 2;
pub const PLAY_WEIGHT: i64 = 1;
pub const ADD_BUMP: i64 = 1;

/// Trending score derived from the two counters
pub fn trending_score(recent_upvotes: i64, recent_plays: i64) -> i64 {
    recent_upvotes * UPVOTE_WEIGHT + recent_plays * PLAY_WEIGHT
}

/// Event that mutates a trending row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingEvent {
    Upvote,
    Downvote,
    Play,
    Add,
}

/// Counter triple of a trending row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrendingCounters {
    pub recent_upvotes: i64,
    pub recent_plays: i64,
    pub trending_score: i64,
}

impl TrendingEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingEvent::Upvote => "upvote",
            TrendingEvent::Downvote => "downvote",
            TrendingEvent::Play => "play",
            TrendingEvent::Add => "add",
        }
    }

    /// Counters after applying this event to `current` (`None` if no row exists yet)
    pub fn apply(&self, current: Option<TrendingCounters>) -> TrendingCounters {
        let c = current.unwrap_or_default();
        match self {
            TrendingEvent::Upvote => {
                let upvotes = c.recent_upvotes + 1;
                TrendingCounters {
                    recent_upvotes: upvotes,
                    recent_plays: c.recent_plays,
                    trending_score: trending_score(upvotes, c.recent_plays),
                }
            }
            TrendingEvent::Downvote => {
                let upvotes = (c.recent_upvotes - 1).max(0);
                TrendingCounters {
                    recent_upvotes: upvotes,
                    recent_plays: c.recent_plays,
                    trending_score: trending_score(upvotes, c.recent_plays),
                }
            }
            TrendingEvent::Play => {
                let plays = c.recent_plays + 1;
                TrendingCounters {
                    recent_upvotes: c.recent_upvotes,
                    recent_plays: plays,
                    trending_score: trending_score(c.recent_upvotes, plays),
                }
            }
            TrendingEvent::Add => TrendingCounters {
                trending_score: c.trending_score + ADD_BUMP,
                ..c
            },
        }
    }

    /// Whether the event rewrites the score from the counters
    pub fn recomputes_score(&self) -> bool {
        !matches!(self, TrendingEvent::Add)
    }
}
