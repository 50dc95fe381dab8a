use std::sync::Arc;

use crate::application::analytics::{AnalyticsEvent, AnalyticsFanOut};
use crate::application::Deadline;
use crate::domain::entities::QueueEntry;
use crate::domain::repositories::{AnalyticsRepository, QueueRepository, RepositoryError};

/// Move a room on to its top-voted unplayed entry
pub struct AdvanceQueue<Q: QueueRepository, A: AnalyticsRepository> {
    queue_repo: Arc<Q>,
    fan_out: AnalyticsFanOut<A>,
    deadline: Deadline,
}

impl<Q: QueueRepository, A: AnalyticsRepository> AdvanceQueue<Q, A> {
    pub fn new(queue_repo: Arc<Q>, analytics_repo: Arc<A>) -> Self {
        Self {
            queue_repo,
            fan_out: AnalyticsFanOut::new(analytics_repo),
            deadline: Deadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn execute(&self, room_id: &str) -> Result<QueueEntry, AdvanceQueueError> {
        let selected = self.deadline.run(self.select_next(room_id)).await?;

        let event = AnalyticsEvent::Played {
            room_id: selected.room_id.clone(),
            video_id: selected.video_id.clone(),
        };
        self.fan_out.dispatch(&event, self.deadline).await;

        Ok(selected)
    }

    async fn select_next(&self, room_id: &str) -> Result<QueueEntry, AdvanceQueueError> {
        let now = chrono::Utc::now().timestamp();
        match self.queue_repo.advance(room_id, now).await? {
            Some(entry) => {
                tracing::info!("Room {} now playing {} ({})", room_id, entry.video_id, entry.id);
                Ok(entry)
            }
            None => {
                tracing::debug!("Room {} has nothing left to play", room_id);
                Err(AdvanceQueueError::EmptyQueue)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdvanceQueueError {
    #[error("Queue is empty")]
    EmptyQueue,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{entry, repos};
    use crate::domain::entities::Vote;

    #[tokio::test]
    async fn test_advance_picks_most_voted_and_counts_play() {
        let (queue, analytics) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();
        queue.insert_entry(&entry("s2", "room", "bob", "y", 20)).await.unwrap();
        queue
            .insert_vote(&Vote::new("carol".into(), "s2".into()))
            .await
            .unwrap();

        let advance = AdvanceQueue::new(queue.clone(), analytics.clone());
        let played = advance.execute("room").await.unwrap();
        assert_eq!(played.id, "s2");
        assert!(played.played);
        assert!(played.played_at.is_some());

        let current = queue.find_current("room").await.unwrap().unwrap();
        assert_eq!(current.id, "s2");
        let trending = analytics.find_trending("room", "y").await.unwrap().unwrap();
        assert_eq!(trending.recent_plays, 1);

        assert_eq!(advance.execute("room").await.unwrap().id, "s1");
    }

    #[tokio::test]
    async fn test_empty_queue_clears_current_selection() {
        let (queue, analytics) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();
        let advance = AdvanceQueue::new(queue.clone(), analytics);

        advance.execute("room").await.unwrap();
        let err = advance.execute("room").await.unwrap_err();
        assert!(matches!(err, AdvanceQueueError::EmptyQueue));
        assert!(queue.find_current("room").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_advances_never_share_an_entry() {
        let (queue, analytics) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();
        queue.insert_entry(&entry("s2", "room", "alice", "y", 20)).await.unwrap();
        let advance = AdvanceQueue::new(queue, analytics);

        let (a, b) = tokio::join!(advance.execute("room"), advance.execute("room"));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.id, b.id);
    }
}
