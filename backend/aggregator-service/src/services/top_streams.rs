//! Platform-wide most-watched live streams

use std::collections::HashMap;
use std::sync::Arc;

use stream_cache::{ttl, CacheKey, StreamCache};
use tracing::warn;

use crate::error::{AppError, Result};
use crate::models::{Platform, Stream, TopStreams};
use crate::platforms::kick::standardize_kick_stream;
use crate::platforms::twitch::standardize_twitch_stream;
use crate::platforms::youtube::{standardize_youtube_stream, YoutubeChannel};
use crate::platforms::{distinct_ids, PlatformClients, YoutubeAuth};
use crate::services::credentials::CredentialService;

const TWITCH_PAGE_SIZE: u32 = 20;
const YOUTUBE_PAGE_SIZE: u32 = 10;

pub struct TopStreamsService {
    credentials: Arc<CredentialService>,
    clients: PlatformClients,
    cache: StreamCache,
}

impl TopStreamsService {
    pub fn new(credentials: Arc<CredentialService>, clients: PlatformClients, cache: StreamCache) -> Self {
        Self {
            credentials,
            clients,
            cache,
        }
    }

    pub async fn for_platform(&self, platform: Platform) -> Result<Vec<Stream>> {
        match platform {
            Platform::Twitch => self.twitch().await,
            Platform::Youtube => self.youtube().await,
            Platform::Kick => self.kick().await,
        }
    }

    /// All three listings; a failing platform contributes `[]`.
    pub async fn all(&self) -> TopStreams {
        let (twitch, kick, youtube) = tokio::join!(self.twitch(), self.kick(), self.youtube());
        TopStreams {
            twitch: or_empty(Platform::Twitch, twitch),
            kick: or_empty(Platform::Kick, kick),
            youtube: or_empty(Platform::Youtube, youtube),
        }
    }

    pub async fn twitch(&self) -> Result<Vec<Stream>> {
        self.cache
            .get_or_fetch(&CacheKey::twitch_top_streams(), ttl::TWITCH_TOP_STREAMS, || async {
                let token = self.credentials.app_token(Platform::Twitch).await?;
                let streams: Vec<Stream> = self
                    .clients
                    .twitch
                    .top_streams(&token, TWITCH_PAGE_SIZE)
                    .await?
                    .iter()
                    .map(standardize_twitch_stream)
                    .collect();

                let ids = distinct_ids(streams.iter().map(|s| s.user_id.as_str()));
                let broadcasters: HashMap<String, Broadcaster> = self
                    .clients
                    .twitch
                    .users_by_id(&token, &ids)
                    .await?
                    .into_iter()
                    .filter_map(|u| {
                        let broadcaster = Broadcaster {
                            name: None,
                            avatar: u.profile_image_url,
                        };
                        u.id.map(|id| (id, broadcaster))
                    })
                    .collect();

                Ok::<_, AppError>(backfill(streams, &broadcasters))
            })
            .await
    }

    pub async fn kick(&self) -> Result<Vec<Stream>> {
        self.cache
            .get_or_fetch(&CacheKey::kick_top_streams(), ttl::KICK_TOP_STREAMS, || async {
                let token = self.credentials.app_token(Platform::Kick).await?;
                let streams: Vec<Stream> = self
                    .clients
                    .kick
                    .livestreams(&token)
                    .await?
                    .iter()
                    .map(standardize_kick_stream)
                    .collect();

                let ids = distinct_ids(streams.iter().map(|s| s.user_id.as_str()));
                let broadcasters: HashMap<String, Broadcaster> = self
                    .clients
                    .kick
                    .users(&token, &ids)
                    .await?
                    .into_iter()
                    .map(|u| {
                        let id = u.id();
                        let broadcaster = Broadcaster {
                            name: u.name,
                            avatar: u.profile_picture,
                        };
                        (id, broadcaster)
                    })
                    .filter(|(id, _)| !id.is_empty())
                    .collect();

                Ok::<_, AppError>(backfill(streams, &broadcasters))
            })
            .await
    }

    /// `search.list` for live videos, then `videos` for viewer counts and
    /// `channels` for avatars. Runs on the API key.
    pub async fn youtube(&self) -> Result<Vec<Stream>> {
        self.cache
            .get_or_fetch(&CacheKey::youtube_top_streams(), ttl::YOUTUBE_TOP_STREAMS, || async {
                let youtube = &self.clients.youtube;
                let video_ids: Vec<String> = youtube
                    .live_search(YOUTUBE_PAGE_SIZE)
                    .await?
                    .iter()
                    .filter_map(|item| item.video_id().map(str::to_string))
                    .collect();
                if video_ids.is_empty() {
                    return Ok(Vec::new());
                }

                let videos = youtube.videos(&video_ids, YoutubeAuth::ApiKey).await?;
                let channel_ids = distinct_ids(videos.iter().filter_map(|v| v.channel_id()));
                let channels: HashMap<String, YoutubeChannel> = youtube
                    .channels(&channel_ids, YoutubeAuth::ApiKey)
                    .await?
                    .into_iter()
                    .filter_map(|c| c.id.clone().map(|id| (id, c)))
                    .collect();

                Ok::<_, AppError>(videos
                    .iter()
                    .map(|v| standardize_youtube_stream(v, v.channel_id().and_then(|id| channels.get(id))))
                    .collect())
            })
            .await
    }
}

fn or_empty(platform: Platform, result: Result<Vec<Stream>>) -> Vec<Stream> {
    result.unwrap_or_else(|e| {
        warn!(%platform, error = %e, "Top streams unavailable");
        Vec::new()
    })
}

/// Profile fields looked up by user id after a streams listing.
struct Broadcaster {
    name: Option<String>,
    avatar: Option<String>,
}

/// Overlay looked-up avatar and display name onto each stream; streams
/// without a lookup hit keep what the listing gave them.
fn backfill(streams: Vec<Stream>, broadcasters: &HashMap<String, Broadcaster>) -> Vec<Stream> {
    streams
        .into_iter()
        .map(|stream| match broadcasters.get(&stream.user_id) {
            Some(found) => Stream {
                user_name: found.name.clone().filter(|n| !n.is_empty()).unwrap_or(stream.user_name.clone()),
                profile_image_url: found.avatar.clone().or(stream.profile_image_url.clone()),
                ..stream
            },
            None => stream,
        })
        .collect()
}
