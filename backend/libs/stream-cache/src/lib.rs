//! Omniview caching layer
//!
//! Every upstream fetch goes through [`StreamCache`]:
//! - read-through / write-through with an explicit TTL per key
//! - backend failures are logged and degrade to a miss, never to an error
//! - values are JSON, so any backend that stores strings works
//!
//! Two backends ship with the crate: [`RedisBackend`] for deployments and
//! [`MemoryBackend`] for single-process runs and tests.

mod error;
mod keys;
mod memory;
mod metrics;
mod redis_backend;

pub use error::{CacheError, CacheResult};
pub use keys::CacheKey;
pub use memory::MemoryBackend;
pub use metrics::CacheMetrics;
pub use redis_backend::RedisBackend;

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// TTL values (seconds)
pub mod ttl {
    pub const TWITCH_TOP_STREAMS: u64 = 60;
    pub const KICK_TOP_STREAMS: u64 = 120;
    pub const YOUTUBE_TOP_STREAMS: u64 = 1200; // search.list costs 100 quota units
    pub const TWITCH_FOLLOWING: u64 = 60;
    pub const YOUTUBE_FOLLOWING: u64 = 300;
    pub const SEARCH: u64 = 300;
    pub const OAUTH_STATE: u64 = 600;
    /// Subtracted from an app token's `expires_in` before caching it.
    pub const APP_TOKEN_MARGIN: u64 = 60;
}

/// String key-value store with per-key expiry.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set_raw(&self, key: &str, value: String, ttl_secs: u64) -> CacheResult<()>;

    /// Atomically read and delete a key.
    async fn take_raw(&self, key: &str) -> CacheResult<Option<String>>;

    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Live keys matching a glob pattern (`*` wildcard).
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Delete every key matching a glob pattern, returning how many went.
    async fn delete_matching(&self, pattern: &str) -> CacheResult<usize>;

    async fn ping(&self) -> bool;
}

/// Typed cache facade shared by every fetcher.
#[derive(Clone)]
pub struct StreamCache {
    backend: Arc<dyn CacheBackend>,
    metrics: CacheMetrics,
}

impl StreamCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            metrics: CacheMetrics::new(),
        }
    }

    /// In-process cache, mainly for tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    /// Returns `None` on miss, on backend failure and on undecodable data.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.get_raw(key).await {
            Ok(Some(data)) => match serde_json::from_str::<T>(&data) {
                Ok(value) => {
                    debug!(key = %key, "Cache hit");
                    self.metrics.record_hit(key);
                    Some(value)
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Cache deserialization failed");
                    self.metrics.record_error(key, "deserialize");
                    let _ = self.backend.del(key).await;
                    None
                }
            },
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                self.metrics.record_miss(key);
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache get failed, treating as miss");
                self.metrics.record_error(key, "get");
                None
            }
        }
    }

    /// Write a value; failures are logged and reported as `false`.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_secs: u64) -> bool {
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache serialization failed");
                self.metrics.record_error(key, "serialize");
                return false;
            }
        };

        match self.backend.set_raw(key, data, ttl_secs).await {
            Ok(()) => {
                debug!(key = %key, ttl = ttl_secs, "Cache set");
                self.metrics.record_write(key);
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache set failed");
                self.metrics.record_error(key, "set");
                false
            }
        }
    }

    /// Read and remove a value in one step.
    pub async fn take<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.take_raw(key).await {
            Ok(Some(data)) => serde_json::from_str(&data)
                .map_err(|e| warn!(key = %key, error = %e, "Cache deserialization failed"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache take failed");
                self.metrics.record_error(key, "take");
                None
            }
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        match self.backend.del(key).await {
            Ok(()) => {
                debug!(key = %key, "Cache delete");
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache delete failed");
                self.metrics.record_error(key, "del");
                false
            }
        }
    }

    /// Read-through: serve a cached value, else run `fetch` and write its
    /// result back. Fetch errors propagate and are never cached.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, ttl_secs: u64, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            return Ok(cached);
        }

        let fresh = fetch().await?;
        self.set(key, &fresh, ttl_secs).await;
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{advance, Duration};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: String,
        viewer_count: u64,
        tags: Vec<String>,
        language: Option<String>,
    }

    fn sample() -> Sample {
        Sample {
            id: "123".into(),
            viewer_count: 500,
            tags: vec!["English".into()],
            language: None,
        }
    }

    struct FailingBackend;

    #[async_trait::async_trait]
    impl CacheBackend for FailingBackend {
        async fn get_raw(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            ))))
        }
        async fn set_raw(&self, _key: &str, _value: String, _ttl: u64) -> CacheResult<()> {
            Err(CacheError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            ))))
        }
        async fn take_raw(&self, key: &str) -> CacheResult<Option<String>> {
            self.get_raw(key).await
        }
        async fn del(&self, _key: &str) -> CacheResult<()> {
            Ok(())
        }
        async fn keys(&self, _pattern: &str) -> CacheResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn delete_matching(&self, _pattern: &str) -> CacheResult<usize> {
            Ok(0)
        }
        async fn ping(&self) -> bool {
            false
        }
    }

    #[tokio::test(start_paused = true)]
    async fn round_trip_until_ttl_elapses() {
        let cache = StreamCache::in_memory();
        assert!(cache.set("twitch:following:1", &sample(), 60).await);

        let hit: Option<Sample> = cache.get("twitch:following:1").await;
        assert_eq!(hit, Some(sample()));

        advance(Duration::from_secs(61)).await;
        let expired: Option<Sample> = cache.get("twitch:following:1").await;
        assert!(expired.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cleared_key_reads_as_miss() {
        let cache = StreamCache::in_memory();
        cache.set("kick:public:top_streams", &vec![sample()], 120).await;
        assert!(cache.delete("kick:public:top_streams").await);
        assert!(cache.get::<Vec<Sample>>("kick:public:top_streams").await.is_none());
    }

    #[tokio::test]
    async fn backend_failures_degrade_to_miss() {
        let cache = StreamCache::new(Arc::new(FailingBackend));
        assert!(!cache.set("search:all:xqc", &sample(), 300).await);
        assert!(cache.get::<Sample>("search:all:xqc").await.is_none());

        let value: Result<Sample, String> = cache
            .get_or_fetch("search:all:xqc", 300, || async { Ok(sample()) })
            .await;
        assert_eq!(value.unwrap(), sample());
    }

    #[tokio::test(start_paused = true)]
    async fn get_or_fetch_only_fetches_on_miss() {
        let cache = StreamCache::in_memory();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<Sample, String> = cache
                .get_or_fetch("google:public:top_streams", 1200, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(sample())
                })
                .await;
            assert_eq!(value.unwrap(), sample());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_errors_are_not_cached() {
        let cache = StreamCache::in_memory();
        let failed: Result<Sample, String> = cache
            .get_or_fetch("twitch:public:top_streams", 60, || async { Err("502".to_string()) })
            .await;
        assert!(failed.is_err());
        assert!(cache.backend().keys("*").await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn undecodable_entry_is_dropped() {
        let cache = StreamCache::in_memory();
        cache
            .backend()
            .set_raw("twitch:following:9", "not json".into(), 60)
            .await
            .unwrap();
        assert!(cache.get::<Sample>("twitch:following:9").await.is_none());
        assert!(cache.backend().get_raw("twitch:following:9").await.unwrap().is_none());
    }
}
