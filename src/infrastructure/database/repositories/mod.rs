mod analytics_repo;
mod queue_repo;

pub use analytics_repo::*;
pub use queue_repo::*;

use crate::domain::repositories::RepositoryError;

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}
