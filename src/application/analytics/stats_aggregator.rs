use std::sync::Arc;

use crate::domain::entities::UserRoomStats;
use crate::domain::repositories::{AnalyticsRepository, RepositoryError};
use crate::domain::services::StatsDelta;

/// Outcome of the two independent upserts triggered by a vote
pub struct VoteStatsUpdate {
    pub voter: Result<UserRoomStats, RepositoryError>,
    pub owner: Result<UserRoomStats, RepositoryError>,
}

/// Keeps per (user, room) counters in step with adds and votes
pub struct StatsAggregator<A: AnalyticsRepository> {
    analytics_repo: Arc<A>,
}

impl<A: AnalyticsRepository> Clone for StatsAggregator<A> {
    fn clone(&self) -> Self {
        Self {
            analytics_repo: self.analytics_repo.clone(),
        }
    }
}

impl<A: AnalyticsRepository> StatsAggregator<A> {
    pub fn new(analytics_repo: Arc<A>) -> Self {
        Self { analytics_repo }
    }

    pub async fn on_song_added(
        &self,
        room_id: &str,
        submitter_id: &str,
    ) -> Result<UserRoomStats, RepositoryError> {
        self.apply(submitter_id, room_id, StatsDelta::song_added())
            .await
    }

    /// Voter gains a like given, owner a like received.
    /// The second upsert runs even if the first fails.
    pub async fn on_vote_cast(
        &self,
        room_id: &str,
        voter_id: &str,
        owner_id: &str,
    ) -> VoteStatsUpdate {
        VoteStatsUpdate {
            voter: self.apply(voter_id, room_id, StatsDelta::like_given()).await,
            owner: self
                .apply(owner_id, room_id, StatsDelta::like_received())
                .await,
        }
    }

    /// Reverse of `on_vote_cast`, floored at zero
    pub async fn on_vote_retracted(
        &self,
        room_id: &str,
        voter_id: &str,
        owner_id: &str,
    ) -> VoteStatsUpdate {
        VoteStatsUpdate {
            voter: self
                .apply(voter_id, room_id, StatsDelta::like_given().negate())
                .await,
            owner: self
                .apply(owner_id, room_id, StatsDelta::like_received().negate())
                .await,
        }
    }

    async fn apply(
        &self,
        user_id: &str,
        room_id: &str,
        delta: StatsDelta,
    ) -> Result<UserRoomStats, RepositoryError> {
        let now = chrono::Utc::now().timestamp();
        self.analytics_repo
            .apply_stats_delta(user_id, room_id, delta, now)
            .await
    }
}
