//! Cross-platform channel lookup by name

use std::sync::Arc;

use stream_cache::{ttl, CacheKey, StreamCache};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::{Platform, SearchResults, StreamerSearchResult};
use crate::platforms::kick::standardize_kick_search;
use crate::platforms::twitch::standardize_twitch_search;
use crate::platforms::youtube::standardize_youtube_search;
use crate::platforms::PlatformClients;
use crate::services::credentials::CredentialService;

pub const MIN_QUERY_LEN: usize = 2;

pub struct SearchService {
    credentials: Arc<CredentialService>,
    clients: PlatformClients,
    cache: StreamCache,
}

impl SearchService {
    pub fn new(credentials: Arc<CredentialService>, clients: PlatformClients, cache: StreamCache) -> Self {
        Self {
            credentials,
            clients,
            cache,
        }
    }

    /// Exact-name match on every platform at once. Each platform fails on
    /// its own and shows up as `None`.
    pub async fn search_all_platforms(&self, query: &str) -> Result<SearchResults> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Err(AppError::Validation(format!(
                "query must be at least {} characters",
                MIN_QUERY_LEN
            )));
        }

        let key = CacheKey::search(query);
        if let Some(cached) = self.cache.get::<SearchResults>(&key).await {
            return Ok(cached);
        }

        let (twitch, kick, youtube) = tokio::join!(
            self.twitch(query),
            self.kick(query),
            self.youtube(query)
        );
        let results = SearchResults {
            twitch: isolate(Platform::Twitch, twitch),
            kick: isolate(Platform::Kick, kick),
            youtube: isolate(Platform::Youtube, youtube),
        };

        info!(
            query = %query,
            twitch = results.twitch.is_some(),
            kick = results.kick.is_some(),
            youtube = results.youtube.is_some(),
            "Search completed"
        );
        self.cache.set(&key, &results, ttl::SEARCH).await;
        Ok(results)
    }

    async fn twitch(&self, query: &str) -> Result<Option<StreamerSearchResult>> {
        let token = self.credentials.app_token(Platform::Twitch).await?;
        let user = self.clients.twitch.user_by_login(&token, &query.to_lowercase()).await?;
        Ok(user.as_ref().map(standardize_twitch_search))
    }

    /// Channel by slug, enriched with the broadcaster's profile picture.
    async fn kick(&self, query: &str) -> Result<Option<StreamerSearchResult>> {
        let token = self.credentials.app_token(Platform::Kick).await?;
        let Some(channel) = self
            .clients
            .kick
            .channel_by_slug(&token, &query.to_lowercase())
            .await?
        else {
            return Ok(None);
        };

        let broadcaster = channel.broadcaster_id();
        let user = if broadcaster.is_empty() {
            None
        } else {
            match self.clients.kick.users(&token, &[broadcaster]).await {
                Ok(users) => users.into_iter().next(),
                Err(e) => {
                    warn!(error = %e, "Kick profile lookup failed, returning channel only");
                    None
                }
            }
        };
        Ok(Some(standardize_kick_search(&channel, user.as_ref())))
    }

    async fn youtube(&self, query: &str) -> Result<Option<StreamerSearchResult>> {
        let handle = format!("@{}", query.trim_start_matches('@'));
        let channel = self.clients.youtube.channel_by_handle(&handle).await?;
        Ok(channel.as_ref().map(standardize_youtube_search))
    }
}

fn isolate(platform: Platform, result: Result<Option<StreamerSearchResult>>) -> Option<StreamerSearchResult> {
    result.unwrap_or_else(|e| {
        warn!(%platform, error = %e, "Search failed on platform");
        None
    })
}
