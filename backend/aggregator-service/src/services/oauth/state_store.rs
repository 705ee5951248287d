//! CSRF state tokens for the OAuth redirect round trip
//!
//! Tokens live in the cache with a ten minute TTL, are bound to the platform
//! that issued them and are consumed atomically, so each one validates once.

use serde::{Deserialize, Serialize};
use stream_cache::{ttl, CacheKey, StreamCache};
use tracing::{debug, warn};
use uuid::Uuid;

use super::OAuthError;
use crate::models::Platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthState {
    pub platform: Platform,
    pub created_at: i64,
}

#[derive(Clone)]
pub struct OAuthStateStore {
    cache: StreamCache,
    ttl_secs: u64,
}

impl OAuthStateStore {
    pub fn new(cache: StreamCache) -> Self {
        Self {
            cache,
            ttl_secs: ttl::OAUTH_STATE,
        }
    }

    /// Mint and persist a 64-hex-char state token for `platform`.
    pub async fn issue(&self, platform: Platform) -> Result<String, OAuthError> {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let state = OAuthState {
            platform,
            created_at: chrono::Utc::now().timestamp(),
        };

        if !self
            .cache
            .set(&CacheKey::oauth_state(&token), &state, self.ttl_secs)
            .await
        {
            return Err(OAuthError::StateStore);
        }

        debug!(%platform, expires_in = self.ttl_secs, "Issued OAuth state");
        Ok(token)
    }

    /// True once per issued token, and only for the issuing platform.
    pub async fn consume(&self, token: &str, platform: Platform) -> bool {
        if token.is_empty() {
            return false;
        }

        match self
            .cache
            .take::<OAuthState>(&CacheKey::oauth_state(token))
            .await
        {
            Some(state) if state.platform == platform => true,
            Some(state) => {
                warn!(expected = %platform, got = %state.platform, "OAuth state platform mismatch");
                false
            }
            None => {
                warn!(%platform, "Unknown or expired OAuth state");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, Duration};

    #[tokio::test(start_paused = true)]
    async fn state_is_single_use() {
        let store = OAuthStateStore::new(StreamCache::in_memory());
        let token = store.issue(Platform::Twitch).await.unwrap();
        assert_eq!(token.len(), 64);

        assert!(store.consume(&token, Platform::Twitch).await);
        assert!(!store.consume(&token, Platform::Twitch).await);
    }

    #[tokio::test(start_paused = true)]
    async fn state_is_platform_bound() {
        let store = OAuthStateStore::new(StreamCache::in_memory());
        let token = store.issue(Platform::Youtube).await.unwrap();
        assert!(!store.consume(&token, Platform::Twitch).await);
        // a mismatched attempt still burns the token
        assert!(!store.consume(&token, Platform::Youtube).await);
    }

    #[tokio::test(start_paused = true)]
    async fn state_expires() {
        let store = OAuthStateStore::new(StreamCache::in_memory());
        let token = store.issue(Platform::Twitch).await.unwrap();
        advance(Duration::from_secs(ttl::OAUTH_STATE + 1)).await;
        assert!(!store.consume(&token, Platform::Twitch).await);
        assert!(!store.consume("", Platform::Twitch).await);
    }
}
