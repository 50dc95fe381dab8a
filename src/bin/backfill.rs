//! Recompute derived room analytics from raw entries and votes.
//!
//! Usage: `backfill [roomId]`. Without a room id every room is rebuilt.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukebox_backend::application::analytics::{BackfillInput, BackfillRoomAnalytics};
use jukebox_backend::infrastructure::config::AppConfig;
use jukebox_backend::infrastructure::database::{
    self,
    repositories::{SqliteAnalyticsRepository, SqliteQueueRepository},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jukebox_backend=info,backfill=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let room_id = std::env::args().nth(1).filter(|r| !r.trim().is_empty());
    let config = AppConfig::from_env()?;

    let db = database::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    let backfill = BackfillRoomAnalytics::new(
        Arc::new(SqliteQueueRepository::new(db.clone())),
        Arc::new(SqliteAnalyticsRepository::new(db)),
        config.windows.trending_play_window_secs,
    );

    match &room_id {
        Some(room) => tracing::info!("Backfilling analytics for room {}", room),
        None => tracing::info!("Backfilling analytics for every room"),
    }

    let rooms = backfill.execute(BackfillInput { room_id }).await?;
    for room in &rooms {
        tracing::info!(
            "Room {}: {} stats rows, {} trending rows",
            room.room_id,
            room.stats_rows,
            room.trending_rows
        );
    }
    tracing::info!("Backfill complete, {} rooms rebuilt", rooms.len());

    Ok(())
}
