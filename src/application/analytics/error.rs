use crate::domain::repositories::RepositoryError;
use crate::domain::value_objects::ReportingWeekError;

/// Error of the analytics read use cases
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsQueryError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<ReportingWeekError> for AnalyticsQueryError {
    fn from(e: ReportingWeekError) -> Self {
        AnalyticsQueryError::Validation(e.to_string())
    }
}
