//! Query Cache
//!
//! Page queries are keyed by a cache key. A fresh entry is served without
//! touching the backend; a stale or missing one is fetched and stored.
//! Stale entries for other keys are pruned whenever a result is stored.
//! Failed fetches are not stored.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::backend::BackendResult;

/// Default freshness window
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30);

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
}

/// Keyed cache for page query results
pub struct QueryCache {
    stale_after: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Serve `key` from the cache while fresh, otherwise run `fetch`
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> BackendResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = BackendResult<T>>,
    {
        if let Some(value) = self.get_fresh::<T>(key).await {
            tracing::trace!(key = %key, "Query cache hit");
            return Ok(value);
        }

        let value = fetch().await?;

        let mut entries = self.entries.write().await;
        let stale_after = self.stale_after;
        entries.retain(|_, entry| entry.fetched_at.elapsed() < stale_after);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: Arc::new(value.clone()),
                fetched_at: Instant::now(),
            },
        );

        Ok(value)
    }

    async fn get_fresh<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.fetched_at.elapsed() >= self.stale_after {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Drop one key so the next load refetches
    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
