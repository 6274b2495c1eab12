//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// For conflicts: the id of the record the request collided with,
    /// so clients can offer a "view existing" action.
    #[serde(rename = "duplicateId", skip_serializing_if = "Option::is_none")]
    pub duplicate_id: Option<i64>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            duplicate_id: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_duplicate_id(mut self, id: Option<i64>) -> Self {
        self.duplicate_id = id;
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// No usable user identity on the request
    Unauthorized(String),
    /// Known identity, but not allowed to touch the record
    Forbidden(String),
    /// The write collides with existing state
    Conflict {
        message: String,
        duplicate_id: Option<i64>,
    },
    /// Internal server error
    Internal(String),
    /// Storage-layer failure that is not one of the cases above
    Repository(RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("UNAUTHORIZED", msg),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg)),
            AppError::Conflict {
                message,
                duplicate_id,
            } => (
                StatusCode::CONFLICT,
                ApiError::new("CONFLICT", message).with_duplicate_id(duplicate_id),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("REPOSITORY_ERROR", e.to_string()),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { message, .. } => AppError::NotFound(message),
            RepositoryError::ValidationError { message, .. } => AppError::BadRequest(message),
            RepositoryError::Forbidden { message, .. } => AppError::Forbidden(message),
            RepositoryError::Conflict { message, context } => AppError::Conflict {
                message,
                duplicate_id: context.entity_id.as_deref().and_then(|id| id.parse().ok()),
            },
            other => AppError::Repository(other),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::ErrorContext;

    #[test]
    fn test_conflict_carries_duplicate_id() {
        let repo_err = RepositoryError::conflict_with_context(
            "already posted",
            ErrorContext::new("create_ladies_day").with_entity_id(42),
        );
        match AppError::from(repo_err) {
            AppError::Conflict {
                duplicate_id: Some(42),
                ..
            } => {}
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn test_not_found_maps_to_404_variant() {
        let err = AppError::from(RepositoryError::not_found("Sauna not found"));
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
