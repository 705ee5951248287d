//! Kick public API payloads and their mapping into unified records

use serde::Deserialize;
use std::fmt;

use crate::models::{Platform, Stream, StreamerSearchResult};

/// Kick ids are integers, but tolerate them arriving as strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KickId {
    Number(u64),
    Text(String),
}

impl fmt::Display for KickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KickId::Number(n) => write!(f, "{}", n),
            KickId::Text(s) => f.write_str(s),
        }
    }
}

fn id_string(id: &Option<KickId>) -> String {
    id.as_ref().map(KickId::to_string).unwrap_or_default()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KickCategory {
    pub id: Option<KickId>,
    pub name: Option<String>,
}

/// Entry of `GET /public/v1/livestreams`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KickLivestream {
    pub broadcaster_user_id: Option<KickId>,
    pub channel_id: Option<KickId>,
    pub slug: Option<String>,
    pub stream_title: Option<String>,
    pub language: Option<String>,
    pub has_mature_content: Option<bool>,
    pub viewer_count: Option<u64>,
    pub thumbnail: Option<String>,
    pub started_at: Option<String>,
    pub category: Option<KickCategory>,
}

/// Entry of `GET /public/v1/users`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KickUser {
    pub user_id: Option<KickId>,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
}

impl KickUser {
    pub fn id(&self) -> String {
        id_string(&self.user_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KickChannelStream {
    pub is_live: Option<bool>,
    pub viewer_count: Option<u64>,
}

/// Entry of `GET /public/v1/channels`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KickChannel {
    pub broadcaster_user_id: Option<KickId>,
    pub slug: Option<String>,
    pub stream_title: Option<String>,
    pub stream: Option<KickChannelStream>,
}

impl KickChannel {
    pub fn broadcaster_id(&self) -> String {
        id_string(&self.broadcaster_user_id)
    }
}

/// Kick list envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

pub fn standardize_kick_stream(raw: &KickLivestream) -> Stream {
    let broadcaster = id_string(&raw.broadcaster_user_id);
    Stream {
        id: broadcaster.clone(),
        user_id: broadcaster,
        user_name: raw.slug.clone().unwrap_or_default(),
        title: raw.stream_title.clone().unwrap_or_default(),
        viewer_count: raw.viewer_count.unwrap_or(0),
        started_at: raw.started_at.clone().unwrap_or_default(),
        language: raw.language.clone().unwrap_or_default(),
        thumbnail_url: raw.thumbnail.clone().unwrap_or_default(),
        is_mature: raw.has_mature_content.unwrap_or(false),
        game_name: raw.category.as_ref().and_then(|c| c.name.clone()),
        stream_type: Some("live".to_string()),
        ..Stream::empty(Platform::Kick)
    }
}

/// Channel match, enriched with the broadcaster's user record when found.
pub fn standardize_kick_search(channel: &KickChannel, user: Option<&KickUser>) -> StreamerSearchResult {
    let slug = channel.slug.clone().unwrap_or_default();
    let (is_live, live_viewer_count) = match &channel.stream {
        Some(stream) => (
            Some(stream.is_live.unwrap_or(false)),
            Some(stream.viewer_count.unwrap_or(0)),
        ),
        None => (Some(false), None),
    };

    StreamerSearchResult {
        platform: Platform::Kick,
        id: channel.broadcaster_id(),
        display_name: user
            .and_then(|u| u.name.clone())
            .unwrap_or_else(|| slug.clone()),
        username: slug,
        profile_image_url: user.and_then(|u| u.profile_picture.clone()),
        broadcaster_type: None,
        is_live,
        live_viewer_count,
    }
}
