use std::collections::HashMap;

use serde::Serialize;

use crate::domain::entities::QueueEntry;
use crate::domain::repositories::{QueueRepository, RepositoryError};

/// Display fields of a song, taken from its most recent queue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetails {
    pub title: String,
    pub url: String,
    pub small_img: String,
    pub big_img: String,
    pub added_by: String,
}

impl From<QueueEntry> for SongDetails {
    fn from(entry: QueueEntry) -> Self {
        Self {
            title: entry.title,
            url: entry.url,
            small_img: entry.small_img,
            big_img: entry.big_img,
            added_by: entry.added_by,
        }
    }
}

/// Details of each song keyed by video id. Songs with no entry are absent.
pub(crate) async fn load_song_details<Q: QueueRepository>(
    queue_repo: &Q,
    room_id: &str,
    video_ids: &[String],
) -> Result<HashMap<String, SongDetails>, RepositoryError> {
    let entries = queue_repo
        .find_latest_by_video_ids(room_id, video_ids)
        .await?;

    Ok(entries
        .into_iter()
        .map(|e| (e.video_id.clone(), SongDetails::from(e)))
        .collect())
}
