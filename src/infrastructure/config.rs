use std::str::FromStr;
use std::time::Duration;

use crate::domain::value_objects::{AdmissionPolicy, RateLimit};

/// Time windows used by the analytics reads and the backfill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsWindows {
    /// Songs played within this window are never recommended
    pub recently_played_secs: i64,
    /// Plays within this window feed the time-similarity signal
    pub time_similarity_secs: i64,
    /// Plays within this window count as recent plays on backfill
    pub trending_play_window_secs: i64,
}

impl Default for AnalyticsWindows {
    fn default() -> Self {
        Self {
            recently_played_secs: 20 * 60,
            time_similarity_secs: 2 * 60 * 60,
            trending_play_window_secs: 3 * 60 * 60,
        }
    }
}

/// Runtime configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub admission: AdmissionPolicy,
    pub windows: AnalyticsWindows,
    pub request_timeout: Duration,
    pub oembed_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/jukebox.db".to_string(),
            jwt_secret: "jukebox-secret-key-change-in-production".to_string(),
            port: 9999,
            admission: AdmissionPolicy::default(),
            windows: AnalyticsWindows::default(),
            request_timeout: Duration::from_secs(15),
            oembed_url: "https://www.youtube.com/oembed".to_string(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables, falling back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        // Get database path from environment
        let db_path = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("DB_PATH"))
            .unwrap_or(defaults.database_url);

        // Ensure path has sqlite: prefix
        let database_url = if db_path.starts_with("sqlite:") {
            db_path
        } else {
            format!("sqlite:{}", db_path)
        };

        let admission = AdmissionPolicy {
            max_queue_len: env_or("MAX_QUEUE_LEN", defaults.admission.max_queue_len),
            duplicate_window_secs: env_or(
                "DUPLICATE_WINDOW_SECS",
                defaults.admission.duplicate_window_secs,
            ),
            short_limit: RateLimit {
                max_adds: env_or("RATE_LIMIT_SHORT_MAX", defaults.admission.short_limit.max_adds),
                window_secs: env_or(
                    "RATE_LIMIT_SHORT_WINDOW_SECS",
                    defaults.admission.short_limit.window_secs,
                ),
            },
            long_limit: RateLimit {
                max_adds: env_or("RATE_LIMIT_LONG_MAX", defaults.admission.long_limit.max_adds),
                window_secs: env_or(
                    "RATE_LIMIT_LONG_WINDOW_SECS",
                    defaults.admission.long_limit.window_secs,
                ),
            },
        };
        admission
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid admission policy: {}", e))?;

        let windows = AnalyticsWindows {
            recently_played_secs: env_or(
                "RECENTLY_PLAYED_WINDOW_SECS",
                defaults.windows.recently_played_secs,
            ),
            time_similarity_secs: env_or(
                "TIME_SIMILARITY_WINDOW_SECS",
                defaults.windows.time_similarity_secs,
            ),
            trending_play_window_secs: env_or(
                "TRENDING_PLAY_WINDOW_SECS",
                defaults.windows.trending_play_window_secs,
            ),
        };

        Ok(Self {
            database_url,
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            port: env_or("PORT", defaults.port),
            admission,
            windows,
            request_timeout: Duration::from_secs(env_or(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            oembed_url: std::env::var("YOUTUBE_OEMBED_URL").unwrap_or(defaults.oembed_url),
        })
    }

    /// In-memory database with default policies
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            ..Self::default()
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}
