use std::sync::Arc;

use crate::application::analytics::{AnalyticsEvent, AnalyticsFanOut};
use crate::application::queue::{find_voted_entry, VoteInput};
use crate::application::Deadline;
use crate::domain::entities::QueueEntry;
use crate::domain::repositories::{AnalyticsRepository, QueueRepository, RepositoryError};

/// Remove a previously cast upvote
pub struct RetractVote<Q: QueueRepository, A: AnalyticsRepository> {
    queue_repo: Arc<Q>,
    fan_out: AnalyticsFanOut<A>,
    deadline: Deadline,
}

impl<Q: QueueRepository, A: AnalyticsRepository> RetractVote<Q, A> {
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

    pub async fn execute(&self, input: VoteInput) -> Result<QueueEntry, RetractVoteError> {
        let voter_id = input.voter_id.clone();
        let entry = self.deadline.run(self.delete_vote(input)).await?;

        let event = AnalyticsEvent::VoteRetracted {
            room_id: entry.room_id.clone(),
            voter_id,
            owner_id: entry.added_by.clone(),
            video_id: entry.video_id.clone(),
        };
        self.fan_out.dispatch(&event, self.deadline).await;

        Ok(entry)
    }

    async fn delete_vote(&self, input: VoteInput) -> Result<QueueEntry, RetractVoteError> {
        let entry = find_voted_entry(self.queue_repo.as_ref(), &input)
            .await?
            .ok_or(RetractVoteError::NotFound)?;

        if !self
            .queue_repo
            .delete_vote(&input.voter_id, &entry.id)
            .await?
        {
            return Err(RetractVoteError::NotFound);
        }

        Ok(entry)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetractVoteError {
    #[error("Vote not found")]
    NotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
