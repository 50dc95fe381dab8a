mod analytics_repository;
mod queue_repository;

pub use analytics_repository::*;
pub use queue_repository::*;
