//! Application error type and axum response mapping

use super::codes::ErrorCode;
use crate::response::ApiResponse;
use axum::Json;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Application error with structured error code
///
/// The primary error type across the platform:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - HTTP mapping via [`ErrorCode::http_status`]
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    // ==================== Convenience constructors ====================

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a business rule error
    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::BusinessRule, msg)
    }

    /// Create a conflict / already-exists error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, msg)
    }

    /// Create a repository (store) error
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::RepositoryError, msg)
    }

    /// Create a serialization / parsing error
    pub fn system(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::SerializationError, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a not authenticated error
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create a permission denied error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();

        // 5xx-class details are logged server-side, never returned verbatim.
        let message = if self.code.is_server_error() {
            error!(code = %self.code, detail = %self.message, "request failed");
            "Something went wrong".to_string()
        } else {
            self.message
        };

        let body = Json(ApiResponse::<()>::error(self.code.as_status(), message));
        (status, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::system(format!("JSON serialization failed: {}", e))
    }
}

/// Result type for operations that surface [`AppError`]
pub type AppResult<T> = Result<T, AppError>;
