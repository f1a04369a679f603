//! Session cache
//!
//! TTL-based key/value store holding the ephemeral current-table-session
//! records. The cache copy is the request-time source of truth; the
//! durable row in the store survives eviction. `NotFound` is a
//! distinguished error kind because callers branch on it ("session
//! expired" vs. "cache unreachable").

mod memory;

pub use memory::MemoryCache;

use std::time::Duration;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::TableSession;
use thiserror::Error;
use uuid::Uuid;

/// Cache error types
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Entry expired: {0}")]
    Expired(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotFound(key) => {
                AppError::with_message(ErrorCode::SessionNotFound, format!("{} not found", key))
            }
            CacheError::Expired(_) => AppError::new(ErrorCode::SessionExpired),
            CacheError::Serialization(msg) => AppError::system(msg),
            CacheError::Backend(msg) => AppError::repository(msg),
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Keyed TTL cache for table sessions
///
/// Values are JSON-serialized [`TableSession`] snapshots.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Fetch the raw value for a key.
    async fn get(&self, key: &str) -> CacheResult<String>;

    /// Store a value with a time-to-live.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Remaining time-to-live for a key. An entry past its deadline
    /// reports a zero duration until it is evicted.
    async fn ttl(&self, key: &str) -> CacheResult<Duration>;

    /// Replace the remaining time-to-live for a key.
    async fn extend_ttl(&self, key: &str, ttl: Duration) -> CacheResult<()>;

    /// Fetch and deserialize the session stored under `session_id`.
    async fn get_session(&self, session_id: &Uuid) -> CacheResult<TableSession> {
        let raw = self.get(&TableSession::cache_key(session_id)).await?;
        serde_json::from_str(&raw).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    /// Serialize and store a session with the given time-to-live.
    async fn put_session(&self, session: &TableSession, ttl: Duration) -> CacheResult<()> {
        let raw = serde_json::to_string(session)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set(&TableSession::cache_key(&session.session_id), raw, ttl)
            .await
    }

    /// Attach an order to the cached session, preserving its TTL.
    ///
    /// Read-modify-write: the current TTL is captured first and the
    /// rewritten entry is stored with that same remaining TTL, so
    /// attaching an order never extends the session's lifetime. Fails
    /// with [`CacheError::Expired`] when the remaining TTL is zero,
    /// without mutating the entry.
    async fn update_order_id(&self, session_id: &Uuid, order_id: i64) -> CacheResult<TableSession> {
        let key = TableSession::cache_key(session_id);

        let remaining = self.ttl(&key).await?;
        if remaining.is_zero() {
            return Err(CacheError::Expired(key));
        }

        let mut session = self.get_session(session_id).await?;
        session.order_id = Some(order_id);

        let raw = serde_json::to_string(&session)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set(&key, raw, remaining).await?;

        Ok(session)
    }
}
