//! In-process session cache
//!
//! DashMap-backed implementation of [`SessionCache`]. Entries carry an
//! absolute deadline; reads evict lazily and a periodic sweeper task
//! clears whatever reads never touch.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use super::{CacheError, CacheResult, SessionCache};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    deadline: Instant,
}

/// In-process TTL cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Remove every entry past its deadline; returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.deadline > now);
        before - self.entries.len()
    }

    /// Number of live entries (expired-but-unswept included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Periodic sweep loop, run under the background task supervisor.
    pub async fn run_sweeper(&self, interval: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("Cache sweeper shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = self.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, "Swept expired cache entries");
                    }
                }
            }
        }
    }
}

#[async_trait]
impl SessionCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<String> {
        match self.entries.get(key) {
            Some(entry) if entry.deadline > Instant::now() => Ok(entry.value.clone()),
            Some(entry) => {
                let key = key.to_string();
                drop(entry);
                self.entries.remove(&key);
                Err(CacheError::NotFound(key))
            }
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                deadline: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn ttl(&self, key: &str) -> CacheResult<Duration> {
        match self.entries.get(key) {
            Some(entry) => Ok(entry.deadline.saturating_duration_since(Instant::now())),
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    async fn extend_ttl(&self, key: &str, ttl: Duration) -> CacheResult<()> {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.deadline = Instant::now() + ttl;
                Ok(())
            }
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }
}
