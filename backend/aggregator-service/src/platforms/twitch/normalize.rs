//! Helix payloads and their mapping into unified records

use serde::Deserialize;

use crate::models::{FollowedStreamer, Platform, Stream, StreamerSearchResult};

/// Entry of `GET /helix/streams` and `GET /helix/streams/followed`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TwitchStream {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub user_login: Option<String>,
    pub user_name: Option<String>,
    pub game_id: Option<String>,
    pub game_name: Option<String>,
    #[serde(rename = "type")]
    pub stream_type: Option<String>,
    pub title: Option<String>,
    pub viewer_count: Option<u64>,
    pub started_at: Option<String>,
    pub language: Option<String>,
    pub thumbnail_url: Option<String>,
    pub tag_ids: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_mature: Option<bool>,
}

/// Entry of `GET /helix/users`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TwitchUser {
    pub id: Option<String>,
    pub login: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub user_type: Option<String>,
    pub broadcaster_type: Option<String>,
    pub description: Option<String>,
    pub profile_image_url: Option<String>,
    pub offline_image_url: Option<String>,
    pub view_count: Option<u64>,
    pub created_at: Option<String>,
}

/// Helix list envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Pagination {
    #[serde(default)]
    pub cursor: Option<String>,
}

pub fn standardize_twitch_stream(raw: &TwitchStream) -> Stream {
    Stream {
        id: raw.id.clone().unwrap_or_default(),
        user_id: raw.user_id.clone().unwrap_or_default(),
        user_name: raw.user_name.clone().unwrap_or_default(),
        title: raw.title.clone().unwrap_or_default(),
        viewer_count: raw.viewer_count.unwrap_or(0),
        started_at: raw.started_at.clone().unwrap_or_default(),
        language: raw.language.clone().unwrap_or_default(),
        thumbnail_url: raw.thumbnail_url.clone().unwrap_or_default(),
        is_mature: raw.is_mature.unwrap_or(false),
        game_name: raw.game_name.clone().filter(|g| !g.is_empty()),
        stream_type: raw.stream_type.clone().filter(|t| !t.is_empty()),
        ..Stream::empty(Platform::Twitch)
    }
}

/// Merge a followed stream with its broadcaster's user record, when known.
pub fn standardize_twitch_follow(raw: &TwitchStream, user: Option<&TwitchUser>) -> FollowedStreamer {
    let user_login = raw.user_login.clone().unwrap_or_default();
    let display_name = user
        .and_then(|u| u.display_name.clone())
        .or_else(|| raw.user_name.clone())
        .unwrap_or_default();

    FollowedStreamer {
        id: raw.id.clone().unwrap_or_default(),
        login: user
            .and_then(|u| u.login.clone())
            .unwrap_or_else(|| user_login.clone()),
        display_name: display_name.clone(),
        stream_type: raw.stream_type.clone().unwrap_or_else(|| "live".to_string()),
        broadcaster_type: user
            .and_then(|u| u.broadcaster_type.clone())
            .unwrap_or_default(),
        description: user.and_then(|u| u.description.clone()).unwrap_or_default(),
        profile_image_url: user.and_then(|u| u.profile_image_url.clone()),
        offline_image_url: user.and_then(|u| u.offline_image_url.clone()),
        view_count: user.and_then(|u| u.view_count).unwrap_or(0),
        created_at: user.and_then(|u| u.created_at.clone()),
        user_id: raw.user_id.clone().unwrap_or_default(),
        user_login,
        user_name: display_name,
        game_id: raw.game_id.clone(),
        game_name: raw.game_name.clone(),
        title: raw.title.clone().unwrap_or_default(),
        viewer_count: raw.viewer_count.unwrap_or(0),
        started_at: raw.started_at.clone().unwrap_or_default(),
        language: raw.language.clone().unwrap_or_default(),
        thumbnail_url: raw.thumbnail_url.clone().unwrap_or_default(),
        tag_ids: raw.tag_ids.clone().unwrap_or_default(),
        tags: raw.tags.clone().unwrap_or_default(),
        is_mature: raw.is_mature.unwrap_or(false),
        ..FollowedStreamer::empty(Platform::Twitch)
    }
}

/// Helix user lookups carry no live state.
pub fn standardize_twitch_search(user: &TwitchUser) -> StreamerSearchResult {
    StreamerSearchResult {
        platform: Platform::Twitch,
        id: user.id.clone().unwrap_or_default(),
        username: user.login.clone().unwrap_or_default(),
        display_name: user.display_name.clone().unwrap_or_default(),
        profile_image_url: user.profile_image_url.clone(),
        broadcaster_type: user.broadcaster_type.clone(),
        is_live: None,
        live_viewer_count: None,
    }
}
