//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Kiosk Server                       │
//! │                                                                         │
//! │  Handler -> Result<T, ApiError>                                         │
//! │         │                                                               │
//! │         ├── CoreError::ValidationFailed ──► 422 { errors: [...] }      │
//! │         ├── CoreError::InvalidReference ──► 422                         │
//! │         ├── CoreError::LineNotFound ──────► 404                         │
//! │         ├── CoreError::PersistenceFailed ─► 500 (generic, logged)       │
//! │         ├── DbError::* ───────────────────► 500 (generic, logged)       │
//! │         ├── JsonRejection ────────────────► 422 { errors: [body] }      │
//! │         └── write guard ──────────────────► 403                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "Please correct the highlighted fields.",
//!   "errors": [
//!     { "field": "customer_name", "message": "Customer name is required." }
//!   ]
//! }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use kiosk_core::{CoreError, ValidationError};
use kiosk_db::DbError;

/// API error returned from handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Per-field problems, present for validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// One field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        FieldError {
            field: err.field(),
            message: err.to_string(),
        }
    }
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (422)
    ValidationError,

    /// Missing/invalid write token or foreign origin (403)
    Forbidden,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    /// Creates a validation error carrying every field message.
    pub fn validation(errors: &[ValidationError]) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: "Please correct the highlighted fields.".to_string(),
            errors: errors.iter().map(FieldError::from).collect(),
        }
    }

    /// Creates a validation error for a request body that could not be read.
    pub fn malformed_body(message: impl Into<String>) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: "The request could not be read.".to_string(),
            errors: vec![FieldError {
                field: "body",
                message: message.into(),
            }],
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationFailed(errors) => ApiError::validation(&errors),
            CoreError::InvalidReference { .. } => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            CoreError::LineNotFound(_) => ApiError::not_found("Item not found in cart."),
            CoreError::PersistenceFailed(ref source) => {
                // Log the actual error but return a generic message
                error!(error = %source, "Order could not be saved");
                ApiError::new(
                    ErrorCode::DatabaseError,
                    "We could not save your order. Please try again.",
                )
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{} not found: {}", entity, id))
            }
            other => {
                error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Unreadable JSON bodies (bad syntax, wrong types, missing content type).
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(status = %rejection.status(), "Rejected request body");
        ApiError::malformed_body(rejection.body_text())
    }
}

/// Session store failures are internal.
impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        error!(error = %err, "Session store failed");
        ApiError::internal("Session unavailable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_core::Collection;

    #[test]
    fn test_validation_carries_every_field() {
        let err = ApiError::from(CoreError::ValidationFailed(vec![
            ValidationError::Required {
                field: "customer_name",
                label: "Customer name",
            },
            ValidationError::InvalidEmail,
        ]));

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].field, "customer_name");
        assert_eq!(err.errors[0].message, "Customer name is required.");
        assert_eq!(err.errors[1].message, "A valid email is required.");
    }

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::from(CoreError::LineNotFound("abc".into()));
        assert_eq!(not_found.code.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(CoreError::InvalidReference {
            collection: Collection::Coffees,
            id: Some(9),
        });
        assert_eq!(invalid.code.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let saved = ApiError::from(CoreError::persistence(std::io::Error::other("disk full")));
        assert_eq!(saved.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!saved.message.contains("disk full"));
    }

    #[test]
    fn test_errors_serialize_as_field_and_message() {
        let err = ApiError::validation(&[ValidationError::InvalidEmail]);
        let json = serde_json::to_value(err).unwrap();

        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(
            json["errors"],
            serde_json::json!([
                { "field": "customer_email", "message": "A valid email is required." }
            ])
        );
    }

    #[test]
    fn test_errors_omitted_when_empty() {
        let json = serde_json::to_value(ApiError::forbidden("nope")).unwrap();
        assert_eq!(json["code"], "FORBIDDEN");
        assert!(json.get("errors").is_none());
    }
}
