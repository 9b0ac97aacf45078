use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CacheResult, CacheStore, Clock, SystemClock, duration_ms};

/// In-process TTL cache shared across clones.
#[derive(Clone)]
pub struct MemoryCacheStore {
    inner: Arc<MemoryCacheInner>,
}

struct MemoryCacheInner {
    entries: RwLock<HashMap<String, CachedValue>>,
    clock: Arc<dyn Clock>,
}

struct CachedValue {
    value: String,
    expires_at_ms: u64,
}

impl CachedValue {
    const fn is_live(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at_ms
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(MemoryCacheInner {
                entries: RwLock::new(HashMap::new()),
                clock,
            }),
        }
    }

    /// Number of entries held, expired or not.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops expired entries and returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let now = self.inner.clock.now_ms();
        let mut map = self.inner.entries.write().await;
        let before = map.len();
        map.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(map.len())
    }

    pub fn spawn_sweeper(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = cache.evict_expired().await;
                if evicted > 0 {
                    debug!(evicted, "evicted expired cache entries");
                }
            }
        })
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = self.inner.clock.now_ms();
        let map = self.inner.entries.read().await;
        Ok(map
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let expires_at_ms = self
            .inner
            .clock
            .now_ms()
            .saturating_add(duration_ms(ttl));
        let mut map = self.inner.entries.write().await;
        map.insert(
            key.to_string(),
            CachedValue {
                value,
                expires_at_ms,
            },
        );
        Ok(())
    }
}
