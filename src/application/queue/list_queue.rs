use std::sync::Arc;

use serde::Serialize;

use crate::application::Deadline;
use crate::domain::entities::{QueueEntry, QueuedEntry};
use crate::domain::repositories::{QueueRepository, RepositoryError};

pub struct ListQueueInput {
    pub room_id: String,
    pub viewer_id: String,
}

/// A room's queue as seen by one viewer
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub streams: Vec<QueuedEntry>,
    pub active_stream: Option<QueueEntry>,
    pub creator_id: String,
    pub is_creator: bool,
}

pub struct ListQueue<Q: QueueRepository> {
    queue_repo: Arc<Q>,
    deadline: Deadline,
}

impl<Q: QueueRepository> ListQueue<Q> {
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

    pub async fn execute(&self, input: ListQueueInput) -> Result<QueueView, RepositoryError> {
        self.deadline.run(self.load(input)).await
    }

    async fn load(&self, input: ListQueueInput) -> Result<QueueView, RepositoryError> {
        let streams = self
            .queue_repo
            .list_queue(&input.room_id, &input.viewer_id)
            .await?;
        let active_stream = self.queue_repo.find_current(&input.room_id).await?;

        Ok(QueueView {
            streams,
            active_stream,
            is_creator: input.room_id == input.viewer_id,
            creator_id: input.room_id,
        })
    }
}
