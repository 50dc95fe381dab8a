//! Video metadata lookup
//!
//! Resolves a video id to its title and thumbnails through the YouTube oEmbed endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

pub const PLACEHOLDER_TITLE: &str = "Can't find video";
pub const DEFAULT_THUMBNAIL: &str =
    "https://cdn.pixabay.com/photo/2024/02/28/07/42/european-shorthair-8601492_640.jpg";

/// Metadata service error
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upstream returned status {0}")]
    Status(u16),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
}

/// Metadata of one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    /// Sorted by width, narrowest first
    pub thumbnails: Vec<Thumbnail>,
    pub channel_name: Option<String>,
    pub channel_url: Option<String>,
}

impl VideoMetadata {
    /// Medium thumbnail, or the default image
    pub fn small_img(&self) -> String {
        let pick = if self.thumbnails.len() > 1 {
            self.thumbnails.get(self.thumbnails.len() - 2)
        } else {
            self.thumbnails.first()
        };
        pick.map(|t| t.url.clone())
            .unwrap_or_else(|| DEFAULT_THUMBNAIL.to_string())
    }

    /// Widest thumbnail, or the default image
    pub fn big_img(&self) -> String {
        self.thumbnails
            .last()
            .map(|t| t.url.clone())
            .unwrap_or_else(|| DEFAULT_THUMBNAIL.to_string())
    }
}

/// Video metadata lookup
#[async_trait]
pub trait VideoMetadataService: Send + Sync {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, MetadataError>;
}

/// oEmbed response
#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    thumbnail_url: Option<String>,
    author_name: Option<String>,
    author_url: Option<String>,
}

/// YouTube oEmbed metadata client
pub struct OEmbedMetadataService {
    client: Client,
    endpoint: String,
}

impl OEmbedMetadataService {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, MetadataError> {
        let client = Client::builder().timeout(timeout).build()?;

        info!("OEmbedMetadataService initialized: {}", endpoint);

        Ok(Self { client, endpoint })
    }

    fn build_metadata(video_id: &str, data: OEmbedResponse) -> VideoMetadata {
        let base_thumb_url = format!("https://img.youtube.com/vi/{}", video_id);

        let mut thumbnails = vec![Thumbnail {
            url: format!("{}/default.jpg", base_thumb_url),
            width: 120,
        }];
        if let Some(url) = data.thumbnail_url.filter(|u| !u.is_empty()) {
            thumbnails.push(Thumbnail { url, width: 480 });
        }
        thumbnails.push(Thumbnail {
            url: format!("{}/maxresdefault.jpg", base_thumb_url),
            width: 1280,
        });
        thumbnails.sort_by_key(|t| t.width);

        VideoMetadata {
            title: data
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
            thumbnails,
            channel_name: data.author_name,
            channel_url: data.author_url,
        }
    }
}

#[async_trait]
impl VideoMetadataService for OEmbedMetadataService {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, MetadataError> {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);

        debug!("Fetching oEmbed metadata for {}", video_id);
        let start = std::time::Instant::now();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            error!("oEmbed lookup failed for {}: {}", video_id, status);
            return Err(MetadataError::Status(status.as_u16()));
        }

        let data: OEmbedResponse = response
            .json()
            .await
            .map_err(|e| MetadataError::InvalidResponse(e.to_string()))?;

        debug!("oEmbed metadata for {} received in {:?}", video_id, start.elapsed());

        Ok(Self::build_metadata(video_id, data))
    }
}

/// Mock metadata service for testing
pub struct MockMetadataService {
    fail: bool,
}

impl MockMetadataService {
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// A service whose every lookup fails
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for MockMetadataService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoMetadataService for MockMetadataService {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata, MetadataError> {
        if self.fail {
            return Err(MetadataError::Status(503));
        }

        Ok(OEmbedMetadataService::build_metadata(
            video_id,
            OEmbedResponse {
                title: Some(format!("Video {}", video_id)),
                thumbnail_url: Some(format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id)),
                author_name: Some("Mock Channel".to_string()),
                author_url: None,
            },
        ))
    }
}
