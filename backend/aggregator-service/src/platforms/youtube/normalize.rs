//! YouTube Data API v3 payloads and their mapping into unified records

use serde::Deserialize;

use crate::models::{FollowedStreamer, Platform, Stream, StreamerSearchResult};

/// Placeholder category; the Data API exposes no game for live videos.
pub const YOUTUBE_GAME_NAME: &str = "Youtube Content";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Thumbnail {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// Video frames: standard, then high, medium, default.
    pub fn video_frame(&self) -> Option<String> {
        first_url([&self.standard, &self.high, &self.medium, &self.default])
    }

    /// Channel avatars: high, then medium, default.
    pub fn avatar(&self) -> Option<String> {
        first_url([&self.high, &self.medium, &self.default])
    }
}

fn first_url<const N: usize>(candidates: [&Option<Thumbnail>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find_map(|t| t.url.clone().filter(|u| !u.is_empty()))
}

/// `concurrentViewers` is a uint64 rendered as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Number(u64),
    Text(String),
}

impl Count {
    pub fn value(&self) -> u64 {
        match self {
            Count::Number(n) => *n,
            Count::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoSnippet {
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub default_audio_language: Option<String>,
    pub thumbnails: Option<Thumbnails>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveStreamingDetails {
    pub actual_start_time: Option<String>,
    pub scheduled_start_time: Option<String>,
    pub concurrent_viewers: Option<Count>,
    pub active_live_chat_id: Option<String>,
}

/// Entry of `GET /videos?part=snippet,liveStreamingDetails`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YoutubeVideo {
    pub id: Option<String>,
    pub snippet: Option<VideoSnippet>,
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

impl YoutubeVideo {
    /// Live iff the broadcast has actually started.
    pub fn is_live(&self) -> bool {
        self.live_streaming_details
            .as_ref()
            .and_then(|d| d.actual_start_time.as_ref())
            .is_some()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.snippet.as_ref().and_then(|s| s.channel_id.as_deref())
    }

    fn viewer_count(&self) -> u64 {
        self.live_streaming_details
            .as_ref()
            .and_then(|d| d.concurrent_viewers.as_ref())
            .map(Count::value)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub custom_url: Option<String>,
    pub thumbnails: Option<Thumbnails>,
    pub published_at: Option<String>,
}

/// Entry of `GET /channels?part=snippet`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct YoutubeChannel {
    pub id: Option<String>,
    pub snippet: Option<ChannelSnippet>,
}

impl YoutubeChannel {
    pub fn avatar(&self) -> Option<String> {
        self.snippet
            .as_ref()
            .and_then(|s| s.thumbnails.as_ref())
            .and_then(Thumbnails::avatar)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceId {
    pub channel_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubscriptionSnippet {
    pub title: Option<String>,
    pub resource_id: Option<ResourceId>,
}

/// Entry of `GET /subscriptions?mine=true`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub snippet: Option<SubscriptionSnippet>,
}

impl Subscription {
    pub fn channel_id(&self) -> Option<&str> {
        self.snippet
            .as_ref()
            .and_then(|s| s.resource_id.as_ref())
            .and_then(|r| r.channel_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

/// Entry of `GET /search?type=video`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchItem {
    pub id: Option<SearchItemId>,
}

impl SearchItem {
    pub fn video_id(&self) -> Option<&str> {
        self.id.as_ref().and_then(|i| i.video_id.as_deref())
    }
}

/// Data API list envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

pub fn standardize_youtube_stream(video: &YoutubeVideo, channel: Option<&YoutubeChannel>) -> Stream {
    let snippet = video.snippet.clone().unwrap_or_default();
    let details = video.live_streaming_details.clone().unwrap_or_default();

    Stream {
        id: video.id.clone().unwrap_or_default(),
        user_id: snippet.channel_id.clone().unwrap_or_default(),
        user_name: snippet.channel_title.clone().unwrap_or_default(),
        title: snippet.title.clone().unwrap_or_default(),
        viewer_count: video.viewer_count(),
        started_at: details.actual_start_time.unwrap_or_default(),
        language: snippet.default_audio_language.clone().unwrap_or_default(),
        thumbnail_url: snippet
            .thumbnails
            .as_ref()
            .and_then(|t| t.high.as_ref())
            .and_then(|t| t.url.clone())
            .unwrap_or_default(),
        stream_type: Some("live".to_string()),
        profile_image_url: channel.and_then(YoutubeChannel::avatar),
        ..Stream::empty(Platform::Youtube)
    }
}

pub fn standardize_youtube_follow(
    video: &YoutubeVideo,
    channel: Option<&YoutubeChannel>,
) -> FollowedStreamer {
    let snippet = video.snippet.clone().unwrap_or_default();
    let details = video.live_streaming_details.clone().unwrap_or_default();
    let channel_snippet = channel.and_then(|c| c.snippet.clone()).unwrap_or_default();

    let channel_id = channel
        .and_then(|c| c.id.clone())
        .or_else(|| snippet.channel_id.clone())
        .unwrap_or_default();
    let login = channel_snippet.custom_url.clone().unwrap_or_default();
    let display_name = channel_snippet
        .title
        .clone()
        .or_else(|| snippet.channel_title.clone())
        .unwrap_or_default();

    FollowedStreamer {
        id: channel_id.clone(),
        login: login.clone(),
        display_name: display_name.clone(),
        description: channel_snippet.description.clone().unwrap_or_default(),
        profile_image_url: channel.and_then(YoutubeChannel::avatar),
        view_count: video.viewer_count(),
        created_at: channel_snippet.published_at.clone(),
        user_id: channel_id,
        user_login: login,
        user_name: display_name,
        game_name: Some(YOUTUBE_GAME_NAME.to_string()),
        title: snippet.title.clone().unwrap_or_default(),
        viewer_count: video.viewer_count(),
        started_at: details
            .actual_start_time
            .or(details.scheduled_start_time)
            .unwrap_or_default(),
        language: snippet.default_audio_language.clone().unwrap_or_default(),
        thumbnail_url: snippet
            .thumbnails
            .as_ref()
            .and_then(Thumbnails::video_frame)
            .unwrap_or_default(),
        tags: snippet.tags.clone().unwrap_or_default(),
        livechat_id: details.active_live_chat_id,
        video_id: video.id.clone(),
        ..FollowedStreamer::empty(Platform::Youtube)
    }
}

pub fn standardize_youtube_search(channel: &YoutubeChannel) -> StreamerSearchResult {
    let snippet = channel.snippet.clone().unwrap_or_default();
    StreamerSearchResult {
        platform: Platform::Youtube,
        id: channel.id.clone().unwrap_or_default(),
        username: snippet.custom_url.unwrap_or_default().replace('@', ""),
        display_name: snippet.title.unwrap_or_default(),
        profile_image_url: channel.avatar(),
        broadcaster_type: None,
        is_live: None,
        live_viewer_count: None,
    }
}
