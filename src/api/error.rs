use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::analytics::{AnalyticsQueryError, BackfillError};
use crate::application::queue::{
    AddSongError, AdvanceQueueError, CastVoteError, EmptyQueueError, RemoveSongError,
    RetractVoteError,
};
use crate::domain::repositories::RepositoryError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error returned by every route handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                code: code.to_string(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Authentication required")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    fn internal(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        )
        .with_details(details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(what) => ApiError::not_found(format!("Not found: {}", what)),
            RepositoryError::Timeout => ApiError::new(
                StatusCode::GATEWAY_TIMEOUT,
                "DEADLINE_EXCEEDED",
                "Request deadline exceeded",
            ),
            other => {
                tracing::error!("Repository failure: {}", other);
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl From<AddSongError> for ApiError {
    fn from(e: AddSongError) -> Self {
        match e {
            AddSongError::Validation(e) => ApiError::validation(e.to_string()),
            AddSongError::Rejected(reason) => {
                ApiError::new(StatusCode::TOO_MANY_REQUESTS, reason.code(), reason.message())
            }
            AddSongError::Metadata(e) => {
                tracing::error!("Metadata lookup failed: {}", e);
                ApiError::new(
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_METADATA_FAILURE",
                    "Could not fetch video metadata",
                )
                .with_details(e.to_string())
            }
            AddSongError::Repository(e) => e.into(),
        }
    }
}

impl From<CastVoteError> for ApiError {
    fn from(e: CastVoteError) -> Self {
        match e {
            CastVoteError::NotFound => ApiError::not_found(e.to_string()),
            CastVoteError::AlreadyVoted => {
                ApiError::new(StatusCode::CONFLICT, "ALREADY_VOTED", e.to_string())
            }
            CastVoteError::Repository(e) => e.into(),
        }
    }
}

impl From<RetractVoteError> for ApiError {
    fn from(e: RetractVoteError) -> Self {
        match e {
            RetractVoteError::NotFound => ApiError::not_found(e.to_string()),
            RetractVoteError::Repository(e) => e.into(),
        }
    }
}

impl From<AdvanceQueueError> for ApiError {
    fn from(e: AdvanceQueueError) -> Self {
        match e {
            AdvanceQueueError::EmptyQueue => {
                ApiError::new(StatusCode::NOT_FOUND, "EMPTY_QUEUE", e.to_string())
            }
            AdvanceQueueError::Repository(e) => e.into(),
        }
    }
}

impl From<RemoveSongError> for ApiError {
    fn from(e: RemoveSongError) -> Self {
        match e {
            RemoveSongError::NotFound => ApiError::not_found(e.to_string()),
            RemoveSongError::Forbidden => ApiError::forbidden(e.to_string()),
            RemoveSongError::Repository(e) => e.into(),
        }
    }
}

impl From<EmptyQueueError> for ApiError {
    fn from(e: EmptyQueueError) -> Self {
        match e {
            EmptyQueueError::Forbidden => ApiError::forbidden(e.to_string()),
            EmptyQueueError::Repository(e) => e.into(),
        }
    }
}

impl From<AnalyticsQueryError> for ApiError {
    fn from(e: AnalyticsQueryError) -> Self {
        match e {
            AnalyticsQueryError::Validation(message) => ApiError::validation(message),
            AnalyticsQueryError::Repository(e) => e.into(),
        }
    }
}

impl From<BackfillError> for ApiError {
    fn from(e: BackfillError) -> Self {
        match e {
            BackfillError::Repository(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{RejectionReason, VideoIdError};

    #[test]
    fn test_rejections_map_to_429_with_reason_code() {
        let err: ApiError = AddSongError::Rejected(RejectionReason::QueueFull).into();
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.body.code, "QUEUE_FULL");

        let err: ApiError = AddSongError::Validation(VideoIdError::Empty).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_timeout_maps_to_504() {
        let err: ApiError = CastVoteError::Repository(RepositoryError::Timeout).into();
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.body.code, "DEADLINE_EXCEEDED");
    }

    #[test]
    fn test_database_failure_hides_behind_500() {
        let err: ApiError = RepositoryError::Database("disk I/O error".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "Internal server error");
        assert_eq!(err.body.details.as_deref(), Some("Database error: disk I/O error"));
    }
}
