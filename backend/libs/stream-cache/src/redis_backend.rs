use async_trait::async_trait;
use redis::{AsyncCommands, Pipeline};
use redis_utils::SharedConnectionManager;
use tracing::debug;

use crate::{CacheBackend, CacheError, CacheResult};

/// Redis implementation of [`CacheBackend`].
#[derive(Clone)]
pub struct RedisBackend {
    redis: SharedConnectionManager,
}

impl RedisBackend {
    pub fn new(redis: SharedConnectionManager) -> Self {
        Self { redis }
    }

    /// SCAN instead of KEYS so large keyspaces never block the server.
    async fn scan(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.redis.lock().await;
        let mut cursor: u64 = 0;
        let mut found = Vec::new();

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut *conn)
                .await?;
            found.extend(keys);

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(found)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.redis.lock().await;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.redis.lock().await;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn take_raw(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GETDEL")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        Ok(value)
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.redis.lock().await;
        conn.del::<_, ()>(key).await.map_err(CacheError::Redis)?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        self.scan(pattern).await
    }

    async fn delete_matching(&self, pattern: &str) -> CacheResult<usize> {
        let keys = self.scan(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.redis.lock().await;
        let mut pipe = Pipeline::new();
        for key in &keys {
            pipe.del(key);
        }
        pipe.query_async::<_, ()>(&mut *conn).await?;

        debug!(pattern = %pattern, deleted = keys.len(), "Cache scan delete");
        Ok(keys.len())
    }

    async fn ping(&self) -> bool {
        redis_utils::ping(&self.redis).await
    }
}
