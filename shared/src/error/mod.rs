//! Unified error system for the FEAST platform
//!
//! - [`ErrorCode`]: standardized error codes for all error types
//! - [`AppError`]: error type carrying a code and a message
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product errors
//! - 7xxx: Table / session errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! // Default message for the code
//! let err = AppError::new(ErrorCode::SessionExpired);
//!
//! // Custom message
//! let err = AppError::with_message(ErrorCode::TableNotAvailable, "Table 12 is occupied");
//!
//! // Convenience constructors
//! let err = AppError::business_rule("number of people must be positive");
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
