use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static YOUTUBE_URL: OnceLock<Regex> = OnceLock::new();

fn youtube_url_regex() -> &'static Regex {
    YOUTUBE_URL.get_or_init(|| {
        Regex::new(
            r"(?:https?://)?(?:www\.)?(?:m\.)?(?:youtube\.com/(?:.*[?&]v=|(?:v|embed)/)|youtu\.be/)([a-zA-Z0-9_-]{11})(?:[?&\s][^ ]*)?",
        )
        .expect("YouTube URL pattern is valid")
    })
}

/// External (YouTube) video id identifying a song
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Extract the video id from a submitted link
    pub fn from_url(url: &str) -> Result<Self, VideoIdError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(VideoIdError::Empty);
        }

        youtube_url_regex()
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| VideoId(m.as_str().to_string()))
            .ok_or(VideoIdError::InvalidUrl)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VideoIdError {
    #[error("YouTube link cannot be empty")]
    Empty,
    #[error("Invalid YouTube URL format")]
    InvalidUrl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        let id = VideoId::from_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        let id =
            VideoId::from_url("https://youtube.com/watch?list=PL123&v=dQw4w9WgXcQ&t=42").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_short_and_embed_urls() {
        assert_eq!(
            VideoId::from_url("youtu.be/dQw4w9WgXcQ").unwrap().as_str(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            VideoId::from_url("https://m.youtube.com/embed/abc-DEF_123").unwrap().as_str(),
            "abc-DEF_123"
        );
        assert_eq!(
            VideoId::from_url("http://www.youtube.com/v/abc-DEF_123?x=1").unwrap().as_str(),
            "abc-DEF_123"
        );
    }

    #[test]
    fn test_empty_url() {
        assert_eq!(VideoId::from_url("   "), Err(VideoIdError::Empty));
    }

    #[test]
    fn test_not_youtube() {
        assert_eq!(
            VideoId::from_url("https://vimeo.com/123456789"),
            Err(VideoIdError::InvalidUrl)
        );
        assert_eq!(
            VideoId::from_url("https://www.youtube.com/watch?v=short"),
            Err(VideoIdError::InvalidUrl)
        );
    }
}
