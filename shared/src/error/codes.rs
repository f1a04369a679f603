//! Unified error codes for the FEAST platform
//!
//! Error codes are shared across all services and the frontend.
//! They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product errors
//! - 7xxx: Table / session errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Business rule violation
    BusinessRule = 6,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1002,
    /// Token is invalid
    TokenInvalid = 1003,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order item not found
    OrderItemNotFound = 4002,
    /// Order item list is empty
    EmptyOrderItems = 4003,
    /// Order is already completed
    OrderAlreadyCompleted = 4004,
    /// An order already exists for this session
    OrderAlreadyExists = 4005,
    /// Order id is missing or zero
    InvalidOrderId = 4006,

    // ==================== 5xxx: Payment ====================
    /// Payment is not allowed while items are unfinished
    PaymentNotAllowed = 5001,
    /// Payment method is not supported
    PaymentMethodUnsupported = 5002,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product is not available for ordering
    ProductUnavailable = 6002,

    // ==================== 7xxx: Table / Session ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is not available or reserved
    TableNotAvailable = 7002,
    /// Table session not found
    SessionNotFound = 7003,
    /// Table session has expired
    SessionExpired = 7004,
    /// Session extension exceeds the configured cap
    ExtensionCapExceeded = 7005,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Repository (store) error
    RepositoryError = 9002,
    /// Serialization / parsing failure
    SerializationError = 9003,
    /// Configuration error
    ConfigError = 9004,
    /// Event channel error
    EventChannelError = 9005,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::BusinessRule => "Business rule violation",

            Self::NotAuthenticated => "Please login first",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Invalid token",

            Self::PermissionDenied => "Permission denied",

            Self::OrderNotFound => "Order not found",
            Self::OrderItemNotFound => "Order item not found",
            Self::EmptyOrderItems => "Order item list is empty",
            Self::OrderAlreadyCompleted => "Order is already completed",
            Self::OrderAlreadyExists => "An order already exists for this session",
            Self::InvalidOrderId => "Order id is missing or zero",

            Self::PaymentNotAllowed => "Order still has unfinished items",
            Self::PaymentMethodUnsupported => "Payment method is not supported",

            Self::ProductNotFound => "Product not found",
            Self::ProductUnavailable => "Product is not available",

            Self::TableNotFound => "Table not found",
            Self::TableNotAvailable => "Table is not available",
            Self::SessionNotFound => "Table session not found",
            Self::SessionExpired => "Table session has expired",
            Self::ExtensionCapExceeded => "Session extension exceeds the cap",

            Self::InternalError => "Internal server error",
            Self::RepositoryError => "Repository error",
            Self::SerializationError => "Serialization error",
            Self::ConfigError => "Configuration error",
            Self::EventChannelError => "Event channel error",
        }
    }

    /// Whether this code maps to a server-side (5xx) failure whose
    /// details must never reach the client.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::InternalError
                | Self::RepositoryError
                | Self::SerializationError
                | Self::ConfigError
                | Self::EventChannelError
        )
    }

    /// String form used in the response envelope, e.g. "E7004".
    pub fn as_status(&self) -> String {
        format!("E{:04}", *self as u16)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_status())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

/// Raised when deserializing an unknown numeric error code
#[derive(Debug, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            6 => Self::BusinessRule,
            1001 => Self::NotAuthenticated,
            1002 => Self::TokenExpired,
            1003 => Self::TokenInvalid,
            2001 => Self::PermissionDenied,
            4001 => Self::OrderNotFound,
            4002 => Self::OrderItemNotFound,
            4003 => Self::EmptyOrderItems,
            4004 => Self::OrderAlreadyCompleted,
            4005 => Self::OrderAlreadyExists,
            4006 => Self::InvalidOrderId,
            5001 => Self::PaymentNotAllowed,
            5002 => Self::PaymentMethodUnsupported,
            6001 => Self::ProductNotFound,
            6002 => Self::ProductUnavailable,
            7001 => Self::TableNotFound,
            7002 => Self::TableNotAvailable,
            7003 => Self::SessionNotFound,
            7004 => Self::SessionExpired,
            7005 => Self::ExtensionCapExceeded,
            9001 => Self::InternalError,
            9002 => Self::RepositoryError,
            9003 => Self::SerializationError,
            9004 => Self::ConfigError,
            9005 => Self::EventChannelError,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
