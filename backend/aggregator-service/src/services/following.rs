//! Live followed channels across platforms

use std::collections::HashMap;
use std::sync::Arc;

use stream_cache::{ttl, CacheKey, StreamCache};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::{FollowedStreamer, Platform, PlatformSession};
use crate::platforms::twitch::{standardize_twitch_follow, TwitchUser};
use crate::platforms::{distinct_ids, PlatformClients};
use crate::services::credentials::CredentialService;

pub struct FollowingService {
    credentials: Arc<CredentialService>,
    clients: PlatformClients,
    cache: StreamCache,
}

impl FollowingService {
    pub fn new(credentials: Arc<CredentialService>, clients: PlatformClients, cache: StreamCache) -> Self {
        Self {
            credentials,
            clients,
            cache,
        }
    }

    /// Live channels the Twitch account follows, with profile data backfilled.
    pub async fn twitch(&self, session_id: &str) -> Result<Vec<FollowedStreamer>> {
        let record = self
            .credentials
            .ensure_valid_token(Platform::Twitch, session_id)
            .await?;
        let user_id = self.account_id(session_id, &record).await?;
        let token = record.credential.access_token.as_str();

        self.cache
            .get_or_fetch(&CacheKey::twitch_following(&user_id), ttl::TWITCH_FOLLOWING, || {
                self.fetch_twitch(token, &user_id)
            })
            .await
    }

    async fn fetch_twitch(&self, token: &str, user_id: &str) -> Result<Vec<FollowedStreamer>> {
        let streams = self.clients.twitch.followed_streams(token, user_id).await?;
        let ids = distinct_ids(streams.iter().filter_map(|s| s.user_id.as_deref()));
        let users: HashMap<String, TwitchUser> = self
            .clients
            .twitch
            .users_by_id(token, &ids)
            .await?
            .into_iter()
            .filter_map(|u| u.id.clone().map(|id| (id, u)))
            .collect();

        Ok(streams
            .iter()
            .map(|stream| {
                let user = stream.user_id.as_ref().and_then(|id| users.get(id));
                standardize_twitch_follow(stream, user)
            })
            .collect())
    }

    /// Live channels among the YouTube account's subscriptions.
    pub async fn youtube(&self, session_id: &str) -> Result<Vec<FollowedStreamer>> {
        let record = self
            .credentials
            .ensure_valid_token(Platform::Youtube, session_id)
            .await?;
        let channel_id = self.account_id(session_id, &record).await?;
        let token = record.credential.access_token.as_str();

        self.cache
            .get_or_fetch(&CacheKey::youtube_following(&channel_id), ttl::YOUTUBE_FOLLOWING, || async {
                self.clients
                    .youtube
                    .live_subscriptions(token)
                    .await
                    .map_err(AppError::from)
            })
            .await
    }

    /// Every platform the session is signed in to, merged and sorted by
    /// viewers. A platform that is signed out or failing contributes nothing.
    pub async fn all(&self, session_id: &str) -> Vec<FollowedStreamer> {
        let (twitch, youtube) = tokio::join!(self.twitch(session_id), self.youtube(session_id));
        // Kick has no follows API.
        let lists = vec![
            settle(Platform::Twitch, twitch),
            settle(Platform::Youtube, youtube),
        ];
        let merged = merge_by_viewers(lists);
        info!(count = merged.len(), "Aggregated followed streams");
        merged
    }

    /// Provider account id, from the profile captured at login or looked up
    /// and saved on first use.
    async fn account_id(&self, session_id: &str, record: &PlatformSession) -> Result<String> {
        if let Some(profile) = &record.profile {
            return Ok(profile.id.clone());
        }

        let profile = self
            .clients
            .profile(record.platform, &record.credential.access_token)
            .await?
            .ok_or(AppError::NotAuthenticated(record.platform))?;
        let id = profile.id.clone();
        let updated = record.clone().with_profile(Some(profile));
        if let Err(e) = self.credentials.store(session_id, &updated).await {
            warn!(platform = %record.platform, error = %e, "Could not save looked-up profile");
        }
        Ok(id)
    }
}

fn settle(platform: Platform, result: Result<Vec<FollowedStreamer>>) -> Vec<FollowedStreamer> {
    match result {
        Ok(streams) => streams,
        Err(AppError::NotAuthenticated(_)) => {
            debug!(%platform, "Not signed in, skipping follows");
            Vec::new()
        }
        Err(e) => {
            warn!(%platform, error = %e, "Follows fetch failed, contributing nothing");
            Vec::new()
        }
    }
}

/// Concatenate in order, then sort by viewers descending. The sort is stable
/// so equal counts keep concatenation order.
pub fn merge_by_viewers(lists: Vec<Vec<FollowedStreamer>>) -> Vec<FollowedStreamer> {
    let mut merged: Vec<FollowedStreamer> = lists.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.viewer_count.cmp(&a.viewer_count));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streamer(platform: Platform, login: &str, viewers: u64) -> FollowedStreamer {
        FollowedStreamer {
            login: login.into(),
            viewer_count: viewers,
            ..FollowedStreamer::empty(platform)
        }
    }

    #[test]
    fn larger_audience_sorts_first() {
        let merged = merge_by_viewers(vec![
            vec![streamer(Platform::Twitch, "t", 500)],
            vec![streamer(Platform::Youtube, "y", 1200)],
        ]);
        assert_eq!(merged[0].platform, Platform::Youtube);
        assert_eq!(merged[1].platform, Platform::Twitch);
    }

    #[test]
    fn ties_keep_concatenation_order() {
        let merged = merge_by_viewers(vec![
            vec![streamer(Platform::Twitch, "a", 10), streamer(Platform::Twitch, "b", 30)],
            vec![streamer(Platform::Youtube, "c", 10)],
        ]);
        let logins: Vec<&str> = merged.iter().map(|s| s.login.as_str()).collect();
        assert_eq!(logins, vec!["b", "a", "c"]);
    }

    #[test]
    fn failures_settle_to_empty() {
        assert!(settle(Platform::Twitch, Err(AppError::NotAuthenticated(Platform::Twitch))).is_empty());
        assert!(settle(Platform::Youtube, Err(AppError::Internal("boom".into()))).is_empty());
    }
}
