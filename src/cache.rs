use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Memoizes loads per key for a fixed time-to-live.
///
/// Only successful loads are stored. The lock is held while a load runs, so
/// concurrent readers of a stale key wait for one reload instead of each
/// starting their own.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_try_insert_at(key, Instant::now(), load).await
    }

    async fn get_or_try_insert_at<F, Fut, E>(&self, key: &str, now: Instant, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get(key) {
            if now.saturating_duration_since(entry.stored_at) <= self.ttl {
                debug!(key, "cache hit");
                return Ok(entry.value.clone());
            }
        }

        let value = load().await?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                stored_at: now,
            },
        );
        Ok(value)
    }
}
