use std::sync::Arc;

use crate::application::analytics::{AnalyticsEvent, AnalyticsFanOut};
use crate::application::Deadline;
use crate::domain::entities::{QueueEntry, Vote};
use crate::domain::repositories::{AnalyticsRepository, QueueRepository, RepositoryError};

/// Vote input, shared by casting and retracting
pub struct VoteInput {
    pub voter_id: String,
    pub stream_id: String,
    /// When given, the entry must belong to this room
    pub room_id: Option<String>,
}

/// Load the voted entry, checking the optional room scope
pub(crate) async fn find_voted_entry<Q: QueueRepository>(
    queue_repo: &Q,
    input: &VoteInput,
) -> Result<Option<QueueEntry>, RepositoryError> {
    let entry = queue_repo.find_entry(&input.stream_id).await?;
    Ok(entry.filter(|e| input.room_id.as_deref().map_or(true, |room| e.room_id == room)))
}

/// Upvote a queue entry
pub struct CastVote<Q: QueueRepository, A: AnalyticsRepository> {
    queue_repo: Arc<Q>,
    fan_out: AnalyticsFanOut<A>,
    deadline: Deadline,
}

impl<Q: QueueRepository, A: AnalyticsRepository> CastVote<Q, A> {
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

    pub async fn execute(&self, input: VoteInput) -> Result<QueueEntry, CastVoteError> {
        let voter_id = input.voter_id.clone();
        let entry = self.deadline.run(self.insert_vote(input)).await?;

        let event = AnalyticsEvent::VoteCast {
            room_id: entry.room_id.clone(),
            voter_id,
            owner_id: entry.added_by.clone(),
            video_id: entry.video_id.clone(),
        };
        self.fan_out.dispatch(&event, self.deadline).await;

        Ok(entry)
    }

    async fn insert_vote(&self, input: VoteInput) -> Result<QueueEntry, CastVoteError> {
        let entry = find_voted_entry(self.queue_repo.as_ref(), &input)
            .await?
            .ok_or(CastVoteError::NotFound)?;

        let vote = Vote::new(input.voter_id, entry.id.clone());
        self.queue_repo
            .insert_vote(&vote)
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists(_) => CastVoteError::AlreadyVoted,
                RepositoryError::NotFound(_) => CastVoteError::NotFound,
                other => CastVoteError::Repository(other),
            })?;

        Ok(entry)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CastVoteError {
    #[error("Stream not found")]
    NotFound,
    #[error("Already voted")]
    AlreadyVoted,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{
        entry, repos, FailingAnalyticsRepository, SlowAnalyticsRepository,
    };
    use std::time::Duration;

    fn vote(voter: &str, stream: &str, room: Option<&str>) -> VoteInput {
        VoteInput {
            voter_id: voter.into(),
            stream_id: stream.into(),
            room_id: room.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_cast_vote_updates_analytics() {
        let (queue, analytics) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();

        CastVote::new(queue.clone(), analytics.clone())
            .execute(vote("bob", "s1", Some("room")))
            .await
            .unwrap();

        let listed = queue.list_queue("room", "bob").await.unwrap();
        assert_eq!(listed[0].upvotes, 1);
        assert!(listed[0].have_upvoted);

        let owner = analytics.find_stats("alice", "room").await.unwrap().unwrap();
        assert_eq!(owner.total_likes_got, 1);
        let voter = analytics.find_stats("bob", "room").await.unwrap().unwrap();
        assert_eq!(voter.total_likes_given, 1);
        let trending = analytics.find_trending("room", "x").await.unwrap().unwrap();
        assert_eq!((trending.recent_upvotes, trending.trending_score), (1, 2));
    }

    #[tokio::test]
    async fn test_second_vote_is_rejected() {
        let (queue, analytics) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();
        let cast = CastVote::new(queue, analytics.clone());

        cast.execute(vote("bob", "s1", None)).await.unwrap();
        let err = cast.execute(vote("bob", "s1", None)).await.unwrap_err();
        assert!(matches!(err, CastVoteError::AlreadyVoted));

        // Counters were not bumped twice
        let trending = analytics.find_trending("room", "x").await.unwrap().unwrap();
        assert_eq!(trending.recent_upvotes, 1);
    }

    #[tokio::test]
    async fn test_unknown_entry_or_wrong_room_is_not_found() {
        let (queue, analytics) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();
        let cast = CastVote::new(queue, analytics);

        let err = cast.execute(vote("bob", "missing", None)).await.unwrap_err();
        assert!(matches!(err, CastVoteError::NotFound));

        let err = cast.execute(vote("bob", "s1", Some("elsewhere"))).await.unwrap_err();
        assert!(matches!(err, CastVoteError::NotFound));
    }

    #[tokio::test]
    async fn test_vote_succeeds_when_analytics_store_fails() {
        let (queue, _) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();

        CastVote::new(queue.clone(), Arc::new(FailingAnalyticsRepository))
            .execute(vote("bob", "s1", None))
            .await
            .unwrap();

        let listed = queue.list_queue("room", "bob").await.unwrap();
        assert_eq!(listed[0].upvotes, 1);
    }

    #[tokio::test]
    async fn test_slow_analytics_cannot_time_out_a_committed_vote() {
        let (queue, analytics) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();
        let slow = Arc::new(SlowAnalyticsRepository::new(analytics.clone(), Duration::from_secs(2)));

        let voted = CastVote::new(queue.clone(), slow)
            .with_deadline(Deadline::after(Duration::from_millis(200)))
            .execute(vote("bob", "s1", None))
            .await
            .unwrap();
        assert_eq!(voted.id, "s1");

        let listed = queue.list_queue("room", "bob").await.unwrap();
        assert_eq!(listed[0].upvotes, 1);
        // The side effects hit the deadline and were dropped
        assert!(analytics.find_trending("room", "x").await.unwrap().is_none());
    }
}
