use std::sync::Arc;

use crate::application::analytics::AnalyticsQueryError;
use crate::application::Deadline;
use crate::domain::entities::StatsSnapshot;
use crate::domain::repositories::AnalyticsRepository;

pub struct GetStatsInput {
    pub user_id: String,
    pub room_id: String,
}

/// Read a user's counters in a room. Missing rows read as zero.
pub struct GetStats<A: AnalyticsRepository> {
    analytics_repo: Arc<A>,
    deadline: Deadline,
}

impl<A: AnalyticsRepository> GetStats<A> {
    pub fn new(analytics_repo: Arc<A>) -> Self {
        Self {
            analytics_repo,
            deadline: Deadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn execute(&self, input: GetStatsInput) -> Result<StatsSnapshot, AnalyticsQueryError> {
        self.deadline.run(self.run(input)).await
    }

    async fn run(&self, input: GetStatsInput) -> Result<StatsSnapshot, AnalyticsQueryError> {
        let stats = self
            .analytics_repo
            .find_stats(&input.user_id, &input.room_id)
            .await?;

        Ok(StatsSnapshot::from_stats(&input.room_id, stats.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::analytics_repo;
    use crate::domain::repositories::AnalyticsRepository;
    use crate::domain::services::StatsDelta;

    #[tokio::test]
    async fn test_average_likes() {
        let repo = analytics_repo().await;
        for _ in 0..4 {
            repo.apply_stats_delta("alice", "room", StatsDelta::song_added(), 1).await.unwrap();
        }
        for _ in 0..2 {
            repo.apply_stats_delta("alice", "room", StatsDelta::like_received(), 2).await.unwrap();
        }

        let snapshot = GetStats::new(repo)
            .execute(GetStatsInput {
                user_id: "alice".into(),
                room_id: "room".into(),
            })
            .await
            .unwrap();

        assert_eq!(snapshot.total_added, 4);
        assert_eq!(snapshot.total_likes_got, 2);
        assert!((snapshot.avg_likes - 0.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.last_updated, Some(2));
    }

    #[tokio::test]
    async fn test_no_activity_reads_as_zero() {
        let snapshot = GetStats::new(analytics_repo().await)
            .execute(GetStatsInput {
                user_id: "nobody".into(),
                room_id: "room".into(),
            })
            .await
            .unwrap();

        assert_eq!(snapshot.total_added, 0);
        assert_eq!(snapshot.avg_likes, 0.0);
        assert_eq!(snapshot.last_updated, None);
    }
}
