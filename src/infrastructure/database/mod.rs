pub mod repositories;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Connect to SQLite and apply the embedded schema.
///
/// In-memory databases are held on a single never-recycled connection so
/// every query sees the same database.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    if !in_memory {
        ensure_parent_dir(options.get_filename());
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options.connect_with(options).await?;
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Apply embedded migrations. Every statement is idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    const MIGRATIONS: &[&str] = &[include_str!("../../../migrations/0001_init.sql")];

    for migration in MIGRATIONS {
        sqlx::raw_sql(migration).execute(pool).await?;
    }

    tracing::debug!("Applied {} migration(s)", MIGRATIONS.len());
    Ok(())
}

fn ensure_parent_dir(path: &std::path::Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Could not create database directory {}: {}", parent.display(), e);
        }
    }
}
