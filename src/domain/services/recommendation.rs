//! "What to add next" ranking.
//!
//! Candidates are songs with a room trending score or with votes on the
//! user's own submissions, minus anything queued or recently played. The
//! composite is a fixed weighted sum of the raw counters; the counters are
//! not normalized against each other.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

/// Weights of the composite recommendation score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationWeights {
    pub user_success: f64,
    pub room_score: f64,
    pub time_score: f64,
}

impl Default for RecommendationWeights {
    fn default() -> Self {
        Self {
            user_success: 0.5,
            room_score: 0.3,
            time_score: 0.2,
        }
    }
}

/// Raw per-song signals collected for one (room, user)
#[derive(Debug, Clone, Default)]
pub struct RecommendationSignals {
    /// Songs queued and unplayed, or played within the recent window
    pub excluded: HashSet<String>,
    /// Trending score per song, in trending order
    pub room_scores: Vec<(String, i64)>,
    /// Votes received on the user's submissions, per song
    pub user_success: Vec<(String, i64)>,
    /// Plays within the short time-similarity window, per song
    pub time_scores: HashMap<String, i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreParts {
    pub user: i64,
    pub room: i64,
    pub time: i64,
}

/// Ranked candidate song
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSong {
    pub video_id: String,
    pub score: f64,
    pub parts: ScoreParts,
}

/// Rank candidates by composite score, highest first.
///
/// Ties keep candidate order: trending songs first (in trending order),
/// then the user's own successful songs.
pub fn rank_candidates(
    signals: &RecommendationSignals,
    weights: &RecommendationWeights,
) -> Vec<ScoredSong> {
    let mut room: HashMap<&str, i64> = HashMap::new();
    let mut user: HashMap<&str, i64> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (video_id, score) in &signals.room_scores {
        let slot = room.entry(video_id.as_str()).or_insert(*score);
        *slot = (*slot).max(*score);
        if seen.insert(video_id.as_str()) {
            order.push(video_id.as_str());
        }
    }

    for (video_id, count) in &signals.user_success {
        *user.entry(video_id.as_str()).or_insert(0) += count;
        if seen.insert(video_id.as_str()) {
            order.push(video_id.as_str());
        }
    }

    let mut scored: Vec<ScoredSong> = order
        .into_iter()
        .filter(|video_id| !video_id.is_empty() && !signals.excluded.contains(*video_id))
        .map(|video_id| {
            let parts = ScoreParts {
                user: user.get(video_id).copied().unwrap_or(0),
                room: room.get(video_id).copied().unwrap_or(0),
                time: signals.time_scores.get(video_id).copied().unwrap_or(0),
            };
            ScoredSong {
                video_id: video_id.to_string(),
                score: parts.user as f64 * weights.user_success
                    + parts.room as f64 * weights.room_score
                    + parts.time as f64 * weights.time_score,
                parts,
            }
        })
        .collect();

    // Stable sort keeps candidate order on ties
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
