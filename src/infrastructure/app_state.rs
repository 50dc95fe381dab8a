use std::sync::Arc;

use async_broadcast::{broadcast, InactiveReceiver, Sender, TrySendError};
use sqlx::SqlitePool;

use crate::application::Deadline;
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database;
use crate::infrastructure::database::repositories::{
    SqliteAnalyticsRepository, SqliteQueueRepository,
};
use crate::infrastructure::services::{OEmbedMetadataService, VideoMetadataService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Runtime configuration
    pub config: AppConfig,

    /// JWT service for token management
    pub jwt_service: Arc<JwtService>,

    /// Queue entries, votes and current selections
    pub queue_repo: Arc<SqliteQueueRepository>,

    /// Derived stats and trending rows
    pub analytics_repo: Arc<SqliteAnalyticsRepository>,

    /// Video metadata lookup
    pub metadata: Arc<dyn VideoMetadataService>,

    /// Event broadcaster for SSE
    pub event_sender: Sender<RoomEvent>,
    _event_keepalive: InactiveReceiver<RoomEvent>,
}

impl AppState {
    /// Build the state from environment configuration
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let metadata = Arc::new(OEmbedMetadataService::new(
            config.oembed_url.clone(),
            config.request_timeout,
        )?);

        Self::from_config(config, metadata).await
    }

    pub async fn from_config(
        config: AppConfig,
        metadata: Arc<dyn VideoMetadataService>,
    ) -> anyhow::Result<Self> {
        tracing::info!("Connecting to database: {}", config.database_url);

        // Connect to database and apply the schema
        let db = database::connect(&config.database_url).await?;

        let jwt_service = Arc::new(JwtService::new(config.jwt_secret.clone()));

        // Create repositories
        let queue_repo = Arc::new(SqliteQueueRepository::new(db.clone()));
        let analytics_repo = Arc::new(SqliteAnalyticsRepository::new(db.clone()));

        // Create event broadcaster (capacity of 1000 events, oldest dropped first)
        let (mut event_sender, event_receiver) = broadcast(1000);
        event_sender.set_overflow(true);
        event_sender.set_await_active(false);

        Ok(Self {
            db,
            config,
            jwt_service,
            queue_repo,
            analytics_repo,
            metadata,
            event_sender,
            _event_keepalive: event_receiver.deactivate(),
        })
    }

    /// Deadline for one request
    pub fn request_deadline(&self) -> Deadline {
        Deadline::after(self.config.request_timeout)
    }

    /// Broadcast an event to all connected SSE clients
    pub fn broadcast_event(&self, event: RoomEvent) {
        let receiver_count = self.event_sender.receiver_count();
        tracing::debug!(
            "Broadcasting event '{}' to {} receivers",
            event.event_type,
            receiver_count
        );
        match self.event_sender.try_broadcast(event) {
            Ok(None) => {}
            Ok(Some(_)) => {
                tracing::debug!("Event broadcast with overflow");
            }
            Err(TrySendError::Inactive(_)) => {
                tracing::debug!("Event dropped, no active receivers");
            }
            Err(e) => {
                tracing::warn!("Failed to broadcast event: {:?}", e);
            }
        }
    }
}

/// Room event for SSE broadcasting
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub room_id: String,
    pub user_id: Option<String>,
    /// Additional data fields (flattened into root)
    #[serde(flatten)]
    pub data: serde_json::Value,
    pub timestamp: i64,
}

impl RoomEvent {
    pub fn new(event_type: &str, room_id: &str, user_id: Option<String>) -> Self {
        Self {
            event_type: event_type.to_string(),
            room_id: room_id.to_string(),
            user_id,
            data: serde_json::Value::Object(serde_json::Map::new()),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}
