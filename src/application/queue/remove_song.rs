use std::sync::Arc;

use crate::application::Deadline;
use crate::domain::entities::QueueEntry;
use crate::domain::repositories::{QueueRepository, RepositoryError};

pub struct RemoveSongInput {
    pub actor_id: String,
    pub stream_id: String,
}

/// Delete one unplayed entry. Allowed for the room owner and the submitter.
///
/// Derived analytics are left as they are; a backfill recomputes them.
pub struct RemoveSong<Q: QueueRepository> {
    queue_repo: Arc<Q>,
    deadline: Deadline,
}

impl<Q: QueueRepository> RemoveSong<Q> {
    pub fn new(queue_repo: Arc<Q>) -> Self {
        Self {
            queue_repo,
            deadline: Deadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn execute(&self, input: RemoveSongInput) -> Result<QueueEntry, RemoveSongError> {
        self.deadline.run(self.remove(input)).await
    }

    async fn remove(&self, input: RemoveSongInput) -> Result<QueueEntry, RemoveSongError> {
        let entry = self
            .queue_repo
            .find_entry(&input.stream_id)
            .await?
            .filter(|e| !e.played)
            .ok_or(RemoveSongError::NotFound)?;

        if !entry.is_room_owner(&input.actor_id) && !entry.is_added_by(&input.actor_id) {
            return Err(RemoveSongError::Forbidden);
        }

        if !self.queue_repo.delete_entry(&entry.id).await? {
            return Err(RemoveSongError::NotFound);
        }

        tracing::info!(
            "Entry {} removed from room {} by {}",
            entry.id,
            entry.room_id,
            input.actor_id
        );

        Ok(entry)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveSongError {
    #[error("Stream not found")]
    NotFound,
    #[error("Only the room owner or the submitter can remove this song")]
    Forbidden,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Delete every unplayed entry of the owner's room
pub struct EmptyQueue<Q: QueueRepository> {
    queue_repo: Arc<Q>,
    deadline: Deadline,
}

impl<Q: QueueRepository> EmptyQueue<Q> {
    pub fn new(queue_repo: Arc<Q>) -> Self {
        Self {
            queue_repo,
            deadline: Deadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Empties `room_id` on behalf of `actor_id`. Returns the number of deleted entries.
    pub async fn execute(&self, room_id: &str, actor_id: &str) -> Result<u64, EmptyQueueError> {
        if room_id != actor_id {
            return Err(EmptyQueueError::Forbidden);
        }

        let deleted = self
            .deadline
            .run(self.queue_repo.delete_unplayed(room_id))
            .await?;
        tracing::info!("Room {} emptied, {} entries deleted", room_id, deleted);

        Ok(deleted)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmptyQueueError {
    #[error("Only the room owner can empty the queue")]
    Forbidden,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{entry, repos};

    fn remove(actor: &str, stream: &str) -> RemoveSongInput {
        RemoveSongInput {
            actor_id: actor.into(),
            stream_id: stream.into(),
        }
    }

    #[tokio::test]
    async fn test_owner_and_submitter_can_remove() {
        let (queue, _) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();
        queue.insert_entry(&entry("s2", "room", "alice", "y", 20)).await.unwrap();
        let remove_song = RemoveSong::new(queue.clone());

        remove_song.execute(remove("alice", "s1")).await.unwrap();
        remove_song.execute(remove("room", "s2")).await.unwrap();
        assert_eq!(queue.count_unplayed("room").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_others_are_forbidden() {
        let (queue, _) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();

        let err = RemoveSong::new(queue.clone())
            .execute(remove("mallory", "s1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoveSongError::Forbidden));
        assert_eq!(queue.count_unplayed("room").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_played_or_missing_entry_is_not_found() {
        let (queue, _) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();
        queue.advance("room", 20).await.unwrap();
        let remove_song = RemoveSong::new(queue);

        let err = remove_song.execute(remove("room", "s1")).await.unwrap_err();
        assert!(matches!(err, RemoveSongError::NotFound));
        let err = remove_song.execute(remove("room", "nope")).await.unwrap_err();
        assert!(matches!(err, RemoveSongError::NotFound));
    }

    #[tokio::test]
    async fn test_empty_queue_is_owner_only() {
        let (queue, _) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "x", 10)).await.unwrap();
        queue.insert_entry(&entry("s2", "room", "bob", "y", 20)).await.unwrap();
        let empty = EmptyQueue::new(queue.clone());

        let err = empty.execute("room", "alice").await.unwrap_err();
        assert!(matches!(err, EmptyQueueError::Forbidden));

        assert_eq!(empty.execute("room", "room").await.unwrap(), 2);
        assert_eq!(queue.count_unplayed("room").await.unwrap(), 0);
    }
}
