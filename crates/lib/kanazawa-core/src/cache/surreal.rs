use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kanazawa_store::schema::TABLE_TOOL_CACHE;
use serde::{Deserialize, Serialize};
use surrealdb::{Connection, Surreal};

use super::{CacheResult, CacheStore, Clock, SystemClock, duration_ms};

/// Cache backed by a `SurrealDB` table, shareable across processes.
///
/// Each key maps to one record id in `tool_cache`; expired records are removed
/// lazily on read.
pub struct SurrealCacheStore<C: Connection> {
    db: Arc<Surreal<C>>,
    clock: Arc<dyn Clock>,
}

impl<C: Connection> Clone for SurrealCacheStore<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            clock: self.clock.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheRecord {
    value: String,
    expires_at_ms: i64,
}

impl<C: Connection> SurrealCacheStore<C> {
    #[must_use]
    pub fn new(db: Surreal<C>) -> Self {
        Self::from_arc(Arc::new(db))
    }

    #[must_use]
    pub fn from_arc(db: Arc<Surreal<C>>) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn now_ms(&self) -> i64 {
        i64::try_from(self.clock.now_ms()).unwrap_or(i64::MAX)
    }
}

#[async_trait]
impl<C: Connection> CacheStore for SurrealCacheStore<C> {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let record: Option<CacheRecord> = self.db.select((TABLE_TOOL_CACHE, key)).await?;
        let Some(record) = record else {
            return Ok(None);
        };
        if record.expires_at_ms > self.now_ms() {
            return Ok(Some(record.value));
        }
        let _: Option<CacheRecord> = self.db.delete((TABLE_TOOL_CACHE, key)).await?;
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let ttl_ms = i64::try_from(duration_ms(ttl)).unwrap_or(i64::MAX);
        let record = CacheRecord {
            value,
            expires_at_ms: self.now_ms().saturating_add(ttl_ms),
        };
        let _: Option<CacheRecord> = self
            .db
            .upsert((TABLE_TOOL_CACHE, key.to_string()))
            .content(record)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use surrealdb::engine::local::{Db, Mem};

    async fn build_cache(clock: Arc<ManualClock>) -> SurrealCacheStore<Db> {
        let db = Surreal::new::<Mem>(())
            .await
            .expect("failed to create in-memory surrealdb instance");
        db.use_ns("kanazawa")
            .use_db("cache")
            .await
            .expect("failed to select surrealdb namespace/db");
        SurrealCacheStore::new(db).with_clock(clock)
    }

    #[tokio::test]
    async fn stores_and_expires_values() {
        let clock = Arc::new(ManualClock::new(10_000));
        let cache = build_cache(clock.clone()).await;
        let key = r#"mcp:search_tourist_spots:{"keyword": "兵", "limit": 5}"#;

        cache
            .set(key, "{}".to_string(), Duration::from_secs(300))
            .await
            .expect("set should succeed");
        assert_eq!(cache.get(key).await.unwrap().as_deref(), Some("{}"));

        clock.advance(Duration::from_secs(300));
        assert_eq!(cache.get(key).await.unwrap(), None);
    }
}
