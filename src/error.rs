//! Diary error types with HTTP status code mapping.
//!
//! [`DiaryError`] is the central error type of the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EntryId, EntryKind};
use crate::validation::FieldViolation;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "validation failed: 1 invalid field(s)",
///     "details": [{ "field": "meal.foods", "message": "must contain at least 1 item" }]
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Field violations, present for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Request         | 400 Bad Request / 401        |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum DiaryError {
    /// One or more fields violated their constraints.
    #[error("validation failed: {} invalid field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// The request could not be interpreted at all (e.g. malformed JSON).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No authenticated user accompanied the request.
    #[error("authentication required")]
    Unauthorized,

    /// Entry with the given ID does not exist for this user.
    #[error("diary entry not found: {0}")]
    EntryNotFound(EntryId),

    /// An update targeted the payload the entry does not have.
    #[error("entry {id} is a {actual} entry and cannot be updated as a {requested}")]
    EntryTypeMismatch {
        /// Entry being updated.
        id: EntryId,
        /// Stored discriminant.
        actual: EntryKind,
        /// Discriminant implied by the update.
        requested: EntryKind,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DiaryError {
    /// Shorthand for a validation failure on a single field.
    #[must_use]
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::Unauthorized => 1003,
            Self::EntryNotFound(_) => 2001,
            Self::EntryTypeMismatch { .. } => 2002,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::EntryNotFound(_) => StatusCode::NOT_FOUND,
            Self::EntryTypeMismatch { .. } => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for DiaryError {
    fn from(e: sqlx::Error) -> Self {
        Self::PersistenceError(e.to_string())
    }
}

impl From<Vec<FieldViolation>> for DiaryError {
    fn from(violations: Vec<FieldViolation>) -> Self {
        Self::Validation(violations)
    }
}

impl From<JsonRejection> for DiaryError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for DiaryError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for DiaryError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for DiaryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let message = self.to_string();
        let code = self.error_code();
        let details = match self {
            Self::Validation(violations) => Some(violations),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
