//! Error types for the HTTP layer.
//!
//! Every failure leaves the server as a JSON body:
//!
//! ```json
//! { "code": "not_found", "message": "Student not found: 42" }
//! ```
//!
//! `details` is only present on 500 responses and carries the underlying
//! store message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use bursar_core::{CoreError, ValidationError};
use bursar_db::DbError;

use crate::receipt::RenderError;

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{message}")]
    Internal { message: String, details: String },
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest(message.into())
    }

    pub fn internal(message: impl Into<String>, details: impl ToString) -> Self {
        ApiError::Internal {
            message: message.into(),
            details: details.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Internal { .. } => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match &self {
            ApiError::Internal { message, details } => {
                error!(code, %details, "{message}");
                (message.as_str(), Some(details.as_str()))
            }
            ApiError::Unavailable(message) => {
                warn!(code, "{message}");
                (message.as_str(), None)
            }
            ApiError::InvalidRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => (message.as_str(), None),
        };

        let body = ErrorBody {
            code,
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::ForeignKeyViolation { .. } => {
                ApiError::Conflict("Record is still referenced by payments".to_string())
            }
            DbError::PoolExhausted => {
                ApiError::Unavailable("Database is busy, try again shortly".to_string())
            }
            other => ApiError::internal("Database error", other),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::internal("Failed to generate receipt", err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_statuses() {
        let cases = [
            (DbError::not_found("Student", 42), StatusCode::NOT_FOUND),
            (DbError::duplicate("student", "Asha"), StatusCode::CONFLICT),
            (
                DbError::ForeignKeyViolation {
                    message: "FOREIGN KEY constraint failed".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (DbError::PoolExhausted, StatusCode::SERVICE_UNAVAILABLE),
            (
                DbError::QueryFailed("disk I/O error".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (db_error, status) in cases {
            assert_eq!(ApiError::from(db_error).status(), status);
        }
    }

    #[test]
    fn test_internal_error_keeps_details() {
        let err = ApiError::from(DbError::QueryFailed("disk I/O error".to_string()));
        match err {
            ApiError::Internal { message, details } => {
                assert_eq!(message, "Database error");
                assert!(details.contains("disk I/O error"));
            }
            other => panic!("expected internal error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err = ApiError::from(ValidationError::required("name"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "invalid_request");
        assert_eq!(err.to_string(), "name is required");
    }
}
