use std::sync::Arc;

use crate::application::analytics::{AnalyticsEvent, AnalyticsFanOut};
use crate::application::Deadline;
use crate::domain::entities::QueueEntry;
use crate::domain::repositories::{AnalyticsRepository, QueueRepository, RepositoryError};
use crate::domain::services::check_recent_adds;
use crate::domain::value_objects::{AdmissionPolicy, RejectionReason, VideoId, VideoIdError};
use crate::infrastructure::services::{MetadataError, VideoMetadataService};

/// Add song input
pub struct AddSongInput {
    pub room_id: String,
    pub submitter_id: String,
    pub url: String,
}

/// Add song use case
pub struct AddSong<Q: QueueRepository, A: AnalyticsRepository> {
    queue_repo: Arc<Q>,
    fan_out: AnalyticsFanOut<A>,
    metadata: Arc<dyn VideoMetadataService>,
    policy: AdmissionPolicy,
    deadline: Deadline,
}

impl<Q: QueueRepository, A: AnalyticsRepository> AddSong<Q, A> {
    pub fn new(
        queue_repo: Arc<Q>,
        analytics_repo: Arc<A>,
        metadata: Arc<dyn VideoMetadataService>,
        policy: AdmissionPolicy,
    ) -> Self {
        Self {
            queue_repo,
            fan_out: AnalyticsFanOut::new(analytics_repo),
            metadata,
            policy,
            deadline: Deadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn execute(&self, input: AddSongInput) -> Result<QueueEntry, AddSongError> {
        let entry = self.deadline.run(self.admit_and_insert(input)).await?;

        let event = AnalyticsEvent::SongAdded {
            room_id: entry.room_id.clone(),
            submitter_id: entry.added_by.clone(),
            video_id: entry.video_id.clone(),
        };
        self.fan_out.dispatch(&event, self.deadline).await;

        Ok(entry)
    }

    async fn admit_and_insert(&self, input: AddSongInput) -> Result<QueueEntry, AddSongError> {
        let video_id = VideoId::from_url(&input.url)?;
        let now = chrono::Utc::now().timestamp();

        // Early rejection before the metadata round trip; the insert re-checks
        let recent = self
            .queue_repo
            .find_added_since(&input.room_id, now - self.policy.lookback_secs())
            .await?;
        check_recent_adds(
            &self.policy,
            now,
            &input.room_id,
            &input.submitter_id,
            video_id.as_str(),
            &recent,
        )?;

        let metadata = self
            .metadata
            .fetch_metadata(video_id.as_str())
            .await
            .map_err(AddSongError::Metadata)?;

        let entry = QueueEntry {
            id: uuid::Uuid::new_v4().to_string(),
            room_id: input.room_id,
            added_by: input.submitter_id,
            url: input.url.trim().to_string(),
            video_id: video_id.as_str().to_string(),
            small_img: metadata.small_img(),
            big_img: metadata.big_img(),
            title: metadata.title,
            created_at: now,
            played: false,
            played_at: None,
        };
        self.queue_repo
            .insert_if_admitted(&entry, &self.policy)
            .await??;

        tracing::info!(
            "Song {} added to room {} by {}",
            entry.video_id,
            entry.room_id,
            entry.added_by
        );

        Ok(entry)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddSongError {
    #[error("Validation error: {0}")]
    Validation(#[from] VideoIdError),
    #[error("{0}")]
    Rejected(#[from] RejectionReason),
    #[error("Metadata lookup failed: {0}")]
    Metadata(MetadataError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
