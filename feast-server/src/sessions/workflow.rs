use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{SessionStatus, TableSession};

use crate::cache::{CacheError, SessionCache};
use crate::core::Config;
use crate::store::{Store, StoreError};

/// Session knobs, extracted from [`Config`]
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Lifetime of a freshly opened session
    pub duration: Duration,
    /// Total minutes a session may be extended by, across all extensions
    pub extension_cap_minutes: i64,
    /// Base URL for the scan-to-join link
    pub frontend_base_url: String,
}

impl SessionConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            duration: config.session_duration(),
            extension_cap_minutes: config.session_extension_cap_minutes,
            frontend_base_url: config.frontend_base_url.clone(),
        }
    }
}

/// Response payload for a freshly opened session
#[derive(Debug, Clone, Serialize)]
pub struct OpenedSession {
    #[serde(flatten)]
    pub session: TableSession,
    /// Link encoded into the table QR code
    pub join_url: String,
    pub expires_in_seconds: u64,
}

/// Table-session state machine
///
/// `NO_SESSION → ACTIVE(no order) → ACTIVE(order attached) → CLOSED`.
/// Sole writer of session state; the cache is written after the checks
/// and the durable row inside the table-status-flipping transaction.
pub struct SessionWorkflow {
    store: Arc<dyn Store>,
    cache: Arc<dyn SessionCache>,
    config: SessionConfig,
}

impl SessionWorkflow {
    pub fn new(store: Arc<dyn Store>, cache: Arc<dyn SessionCache>, config: SessionConfig) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// Open a session on a table (`NO_SESSION → ACTIVE`).
    ///
    /// The table must be available or reserved and the party size
    /// positive. On durable-write failure after a successful cache
    /// write the cache entry is deleted again and the error surfaces;
    /// there is no retry.
    pub async fn open(&self, table_id: i64, number_of_people: i32) -> AppResult<OpenedSession> {
        if number_of_people <= 0 {
            return Err(AppError::business_rule("number of people must be positive"));
        }

        let table = self.store.get_table(table_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => AppError::with_message(
                ErrorCode::TableNotFound,
                format!("Table {} not found", table_id),
            ),
            other => other.into(),
        })?;

        if !table.status.accepts_new_session() {
            return Err(AppError::with_message(
                ErrorCode::TableNotAvailable,
                format!("Table {} is not available", table.table_number),
            ));
        }

        let session = TableSession {
            session_id: Uuid::new_v4(),
            table_id,
            table_number: table.table_number,
            status: SessionStatus::Active,
            started_at: Utc::now(),
            order_id: None,
        };

        self.cache
            .put_session(&session, self.config.duration)
            .await?;

        if let Err(e) = self.store.create_table_session(&session).await {
            // Compensate the cache write; the durable row is the record.
            let key = TableSession::cache_key(&session.session_id);
            if let Err(del) = self.cache.delete(&key).await {
                error!(session_id = %session.session_id, error = %del,
                    "Failed to roll back cache entry after store failure");
            }
            return Err(e.into());
        }

        info!(
            session_id = %session.session_id,
            table_id,
            number_of_people,
            "Table session opened"
        );

        Ok(OpenedSession {
            join_url: format!(
                "{}/join/{}",
                self.config.frontend_base_url.trim_end_matches('/'),
                session.session_id
            ),
            expires_in_seconds: self.config.duration.as_secs(),
            session,
        })
    }

    /// Extend the session's remaining lifetime by `minutes`.
    ///
    /// The durable extension record is written first; the cache TTL is
    /// bumped after. Total extensions are bounded by the configured cap.
    pub async fn extend(&self, session_id: &Uuid, minutes: i64) -> AppResult<Duration> {
        if minutes <= 0 {
            return Err(AppError::validation("extension minutes must be positive"));
        }

        let already = self
            .store
            .total_session_extension(session_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => AppError::new(ErrorCode::SessionNotFound),
                other => other.into(),
            })?;
        if already + minutes > self.config.extension_cap_minutes {
            return Err(AppError::with_message(
                ErrorCode::ExtensionCapExceeded,
                format!(
                    "Session already extended by {} of {} allowed minutes",
                    already, self.config.extension_cap_minutes
                ),
            ));
        }

        let key = TableSession::cache_key(session_id);
        let remaining = self.cache.ttl(&key).await.map_err(|e| match e {
            CacheError::NotFound(_) => AppError::new(ErrorCode::SessionExpired),
            other => other.into(),
        })?;
        if remaining.is_zero() {
            return Err(AppError::new(ErrorCode::SessionExpired));
        }

        self.store
            .record_session_extension(session_id, minutes)
            .await?;

        let new_ttl = remaining + Duration::from_secs(minutes as u64 * 60);
        self.cache.extend_ttl(&key, new_ttl).await?;

        info!(%session_id, minutes, "Table session extended");
        Ok(new_ttl)
    }

    /// Current session, cache-first with a durable fallback.
    ///
    /// The durable row is the source of truth on cache miss: an Active
    /// row is returned as-is, a Closed row reads as an expired session.
    pub async fn current(&self, session_id: &Uuid) -> AppResult<TableSession> {
        match self.cache.get_session(session_id).await {
            Ok(session) => Ok(session),
            Err(CacheError::NotFound(_)) => {
                let session =
                    self.store
                        .get_table_session(session_id)
                        .await
                        .map_err(|e| match e {
                            StoreError::NotFound(_) => AppError::new(ErrorCode::SessionNotFound),
                            other => other.into(),
                        })?;
                if session.status == SessionStatus::Closed {
                    return Err(AppError::new(ErrorCode::SessionExpired));
                }
                Ok(session)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Close the session (`ACTIVE → CLOSED`).
    ///
    /// The cache entry goes first; a durable-close failure propagates
    /// without restoring the cache entry.
    pub async fn close(&self, session_id: &Uuid) -> AppResult<()> {
        let key = TableSession::cache_key(session_id);
        if let Err(e) = self.cache.delete(&key).await {
            error!(%session_id, error = %e, "Failed to delete cached session during close");
        }

        self.store
            .close_table_session(session_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => AppError::new(ErrorCode::SessionNotFound),
                other => other.into(),
            })?;

        info!(%session_id, "Table session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::store::mock::FlakyStore;
    use crate::store::SqliteStore;
    use shared::util::IdGenerator;

    async fn seeded_store() -> Arc<SqliteStore> {
        let ids = Arc::new(IdGenerator::new(3).unwrap());
        let store = SqliteStore::open_in_memory(ids).await.unwrap();
        sqlx::query("INSERT INTO tables (id, table_number, seats, status) VALUES (1, 7, 4, 'AVAILABLE')")
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO tables (id, table_number, seats, status) VALUES (2, 8, 2, 'CLEANING')")
            .execute(store.pool())
            .await
            .unwrap();
        Arc::new(store)
    }

    fn test_config() -> SessionConfig {
        SessionConfig {
            duration: Duration::from_secs(90 * 60),
            extension_cap_minutes: 60,
            frontend_base_url: "https://feast.example.com/".into(),
        }
    }

    fn workflow(store: Arc<dyn Store>, cache: Arc<MemoryCache>) -> SessionWorkflow {
        SessionWorkflow::new(store, cache, test_config())
    }

    #[tokio::test]
    async fn open_writes_cache_and_store_and_flips_table() {
        let store = seeded_store().await;
        let cache = Arc::new(MemoryCache::new());
        let flow = workflow(store.clone(), cache.clone());

        let opened = flow.open(1, 2).await.unwrap();
        assert_eq!(opened.session.table_number, 7);
        assert_eq!(opened.session.order_id, None);
        assert_eq!(
            opened.join_url,
            format!("https://feast.example.com/join/{}", opened.session.session_id)
        );

        // Cache holds the session.
        let cached = cache.get_session(&opened.session.session_id).await.unwrap();
        assert_eq!(cached, opened.session);

        // Durable row exists and the table is occupied.
        let durable = store
            .get_table_session(&opened.session.session_id)
            .await
            .unwrap();
        assert_eq!(durable.status, SessionStatus::Active);
        let table = store.get_table(1).await.unwrap();
        assert_eq!(table.status, shared::models::TableStatus::Occupied);
    }

    #[tokio::test]
    async fn open_rejects_unavailable_table_and_bad_party_size() {
        let store = seeded_store().await;
        let cache = Arc::new(MemoryCache::new());
        let flow = workflow(store, cache);

        let err = flow.open(2, 2).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotAvailable);

        let err = flow.open(1, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessRule);

        let err = flow.open(404, 2).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn open_compensates_cache_on_store_failure() {
        let store = seeded_store().await;
        let flaky = Arc::new(FlakyStore::new(store));
        flaky.fail_create_table_session();
        let cache = Arc::new(MemoryCache::new());
        let flow = workflow(flaky, cache.clone());

        let err = flow.open(1, 2).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RepositoryError);
        assert!(cache.is_empty(), "cache entry survived the compensation");
    }

    #[tokio::test]
    async fn extend_bumps_ttl_and_respects_cap() {
        let store = seeded_store().await;
        let cache = Arc::new(MemoryCache::new());
        let flow = workflow(store.clone(), cache.clone());

        let opened = flow.open(1, 2).await.unwrap();
        let id = opened.session.session_id;
        let key = TableSession::cache_key(&id);
        let before = cache.ttl(&key).await.unwrap();

        let new_ttl = flow.extend(&id, 30).await.unwrap();
        assert!(new_ttl > before + Duration::from_secs(29 * 60));
        assert_eq!(store.total_session_extension(&id).await.unwrap(), 30);

        // 30 + 40 > 60 cap
        let err = flow.extend(&id, 40).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExtensionCapExceeded);

        // A second small extension still fits.
        flow.extend(&id, 30).await.unwrap();
        let err = flow.extend(&id, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExtensionCapExceeded);
    }

    #[tokio::test]
    async fn current_falls_back_to_store_on_cache_miss() {
        let store = seeded_store().await;
        let cache = Arc::new(MemoryCache::new());
        let flow = workflow(store.clone(), cache.clone());

        let opened = flow.open(1, 2).await.unwrap();
        let id = opened.session.session_id;

        // Simulate cache eviction.
        cache.delete(&TableSession::cache_key(&id)).await.unwrap();

        let session = flow.current(&id).await.unwrap();
        assert_eq!(session.session_id, id);

        // Closed durable row reads as expired.
        store.close_table_session(&id).await.unwrap();
        let err = flow.current(&id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionExpired);
    }

    #[tokio::test]
    async fn close_deletes_cache_even_when_store_close_fails() {
        let store = seeded_store().await;
        let flaky = Arc::new(FlakyStore::new(store));
        let cache = Arc::new(MemoryCache::new());
        let flow = workflow(flaky.clone(), cache.clone());

        let opened = flow.open(1, 2).await.unwrap();
        let id = opened.session.session_id;

        flaky.fail_close_table_session();
        let err = flow.close(&id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RepositoryError);
        // Cache is not restored.
        assert!(cache
            .get_session(&id)
            .await
            .is_err());
    }
}
