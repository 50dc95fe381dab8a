use std::sync::Arc;

use serde::Serialize;

use crate::application::analytics::{
    clamp_limit, load_song_details, AnalyticsQueryError, SongDetails,
};
use crate::application::Deadline;
use crate::domain::entities::SongCount;
use crate::domain::repositories::QueueRepository;

pub struct GetTopSongsInput {
    pub user_id: String,
    pub room_id: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSong {
    pub video_id: String,
    pub count: i64,
    #[serde(flatten)]
    pub details: Option<SongDetails>,
}

async fn with_details<Q: QueueRepository>(
    queue_repo: &Q,
    room_id: &str,
    mut counts: Vec<SongCount>,
    limit: Option<u32>,
) -> Result<Vec<TopSong>, AnalyticsQueryError> {
    counts.truncate(clamp_limit(limit) as usize);

    let video_ids: Vec<String> = counts.iter().map(|c| c.video_id.clone()).collect();
    let mut details = load_song_details(queue_repo, room_id, &video_ids).await?;

    Ok(counts
        .into_iter()
        .map(|c| TopSong {
            details: details.remove(&c.video_id),
            video_id: c.video_id,
            count: c.count,
        })
        .collect())
}

/// Songs the user added most often in the room
pub struct GetTopAdded<Q: QueueRepository> {
    queue_repo: Arc<Q>,
    deadline: Deadline,
}

impl<Q: QueueRepository> GetTopAdded<Q> {
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

    pub async fn execute(&self, input: GetTopSongsInput) -> Result<Vec<TopSong>, AnalyticsQueryError> {
        self.deadline.run(self.run(input)).await
    }

    async fn run(&self, input: GetTopSongsInput) -> Result<Vec<TopSong>, AnalyticsQueryError> {
        let counts = self
            .queue_repo
            .count_adds_by_song(&input.room_id, &input.user_id)
            .await?;

        with_details(self.queue_repo.as_ref(), &input.room_id, counts, input.limit).await
    }
}

/// The user's songs that received the most votes in the room
pub struct GetTopLiked<Q: QueueRepository> {
    queue_repo: Arc<Q>,
    deadline: Deadline,
}

impl<Q: QueueRepository> GetTopLiked<Q> {
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

    pub async fn execute(&self, input: GetTopSongsInput) -> Result<Vec<TopSong>, AnalyticsQueryError> {
        self.deadline.run(self.run(input)).await
    }

    async fn run(&self, input: GetTopSongsInput) -> Result<Vec<TopSong>, AnalyticsQueryError> {
        let counts = self
            .queue_repo
            .count_votes_received_by_song(&input.room_id, &input.user_id)
            .await?;

        with_details(self.queue_repo.as_ref(), &input.room_id, counts, input.limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{entry, repos};
    use crate::domain::entities::Vote;

    fn input(limit: Option<u32>) -> GetTopSongsInput {
        GetTopSongsInput {
            user_id: "alice".into(),
            room_id: "room".into(),
            limit,
        }
    }

    #[tokio::test]
    async fn test_top_added_and_top_liked() {
        let (queue, _) = repos().await;
        queue.insert_entry(&entry("s1", "room", "alice", "a", 10)).await.unwrap();
        queue.insert_entry(&entry("s2", "room", "alice", "a", 20)).await.unwrap();
        queue.insert_entry(&entry("s3", "room", "alice", "b", 30)).await.unwrap();
        queue.insert_entry(&entry("s4", "room", "bob", "b", 40)).await.unwrap();
        queue.insert_vote(&Vote::new("bob".into(), "s3".into())).await.unwrap();
        queue.insert_vote(&Vote::new("carol".into(), "s3".into())).await.unwrap();
        queue.insert_vote(&Vote::new("carol".into(), "s4".into())).await.unwrap();

        let added = GetTopAdded::new(queue.clone()).execute(input(None)).await.unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!((added[0].video_id.as_str(), added[0].count), ("a", 2));

        let liked = GetTopLiked::new(queue.clone()).execute(input(None)).await.unwrap();
        assert_eq!(liked.len(), 1);
        assert_eq!((liked[0].video_id.as_str(), liked[0].count), ("b", 2));
        // Details come from the most recent entry of the song in the room
        assert_eq!(liked[0].details.as_ref().unwrap().added_by, "bob");

        let capped = GetTopAdded::new(queue).execute(input(Some(1))).await.unwrap();
        assert_eq!(capped.len(), 1);
    }
}
