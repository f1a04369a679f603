//! Table Session Model
//!
//! The ephemeral binding between a physical table and a customer visit.
//! The cache copy is the request-time source of truth (TTL-bounded);
//! the durable row is written in the same transaction as the table
//! status flip and survives cache eviction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Active,
    Closed,
}

impl SessionStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ACTIVE" => Some(Self::Active),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Table session snapshot
///
/// `order_id` is nil until the first order is created for the session,
/// after which it is immutable for the session's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSession {
    pub session_id: Uuid,
    pub table_id: i64,
    pub table_number: i32,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub order_id: Option<i64>,
}

impl TableSession {
    /// Cache key for this session
    pub fn cache_key(session_id: &Uuid) -> String {
        format!("table-session:{}", session_id)
    }
}
