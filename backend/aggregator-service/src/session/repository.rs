use async_trait::async_trait;
use stream_cache::{CacheKey, StreamCache};
use tracing::{debug, warn};

use crate::models::{Platform, PlatformSession};

/// Per-platform credential storage for one browser session.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn get(&self, platform: Platform, session_id: &str) -> Option<PlatformSession>;

    /// Returns `false` when the write did not land.
    async fn put(&self, session_id: &str, record: &PlatformSession) -> bool;

    async fn delete(&self, platform: Platform, session_id: &str);

    /// Drop every platform of a session, returning how many were stored.
    async fn clear(&self, session_id: &str) -> usize;
}

/// [`CredentialRepository`] over the shared cache, keyed
/// `session:{sid}:{platform}` and expiring with the cookie.
#[derive(Clone)]
pub struct CacheCredentialRepository {
    cache: StreamCache,
    ttl_secs: u64,
}

impl CacheCredentialRepository {
    pub fn new(cache: StreamCache, ttl_secs: u64) -> Self {
        Self { cache, ttl_secs }
    }
}

#[async_trait]
impl CredentialRepository for CacheCredentialRepository {
    async fn get(&self, platform: Platform, session_id: &str) -> Option<PlatformSession> {
        let record: PlatformSession = self
            .cache
            .get(&CacheKey::session(session_id, platform.as_str()))
            .await?;
        (record.platform == platform).then_some(record)
    }

    async fn put(&self, session_id: &str, record: &PlatformSession) -> bool {
        let key = CacheKey::session(session_id, record.platform.as_str());
        self.cache.set(&key, record, self.ttl_secs).await
    }

    async fn delete(&self, platform: Platform, session_id: &str) {
        self.cache
            .delete(&CacheKey::session(session_id, platform.as_str()))
            .await;
        debug!(%platform, "Dropped stored credential");
    }

    async fn clear(&self, session_id: &str) -> usize {
        match self
            .cache
            .backend()
            .delete_matching(&CacheKey::session_pattern(session_id))
            .await
        {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "Failed to clear session");
                0
            }
        }
    }
}
