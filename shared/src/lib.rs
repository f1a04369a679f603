//! Shared types for the FEAST ordering platform
//!
//! Common types used across the platform's services: domain models,
//! error types, response envelopes, event-channel messages and the
//! snowflake identifier generator.

pub mod error;
pub mod message;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

// Error re-exports (for convenient access)
pub use error::{AppError, AppResult, ErrorCode};

// Event channel re-exports
pub use message::{ChannelMessage, topics};
