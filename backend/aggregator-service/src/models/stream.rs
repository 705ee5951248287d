//! Unified stream records returned by every listing endpoint

use serde::{Deserialize, Serialize};

use crate::models::Platform;

/// A live broadcast, normalized across platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub title: String,
    pub viewer_count: u64,
    pub started_at: String,
    pub language: String,
    pub thumbnail_url: String,
    pub is_mature: bool,
    pub platform: Platform,
    pub game_name: Option<String>,
    pub stream_type: Option<String>,
    pub profile_image_url: Option<String>,
}

impl Stream {
    /// Empty record for `platform`; normalizers fill in what upstream sent.
    pub fn empty(platform: Platform) -> Self {
        Self {
            id: String::new(),
            user_id: String::new(),
            user_name: String::new(),
            title: String::new(),
            viewer_count: 0,
            started_at: String::new(),
            language: String::new(),
            thumbnail_url: String::new(),
            is_mature: false,
            platform,
            game_name: None,
            stream_type: None,
            profile_image_url: None,
        }
    }
}

/// A followed or subscribed channel that is live right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowedStreamer {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub stream_type: String,
    pub broadcaster_type: String,
    pub description: String,
    pub profile_image_url: Option<String>,
    pub offline_image_url: Option<String>,
    pub view_count: u64,
    pub created_at: Option<String>,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub game_id: Option<String>,
    pub game_name: Option<String>,
    pub title: String,
    pub viewer_count: u64,
    pub started_at: String,
    pub language: String,
    pub thumbnail_url: String,
    pub tag_ids: Vec<String>,
    pub tags: Vec<String>,
    pub is_mature: bool,
    pub livechat_id: Option<String>,
    pub video_id: Option<String>,
    pub platform: Platform,
}

impl FollowedStreamer {
    pub fn empty(platform: Platform) -> Self {
        Self {
            id: String::new(),
            login: String::new(),
            display_name: String::new(),
            stream_type: "live".to_string(),
            broadcaster_type: String::new(),
            description: String::new(),
            profile_image_url: None,
            offline_image_url: None,
            view_count: 0,
            created_at: None,
            user_id: String::new(),
            user_login: String::new(),
            user_name: String::new(),
            game_id: None,
            game_name: None,
            title: String::new(),
            viewer_count: 0,
            started_at: String::new(),
            language: String::new(),
            thumbnail_url: String::new(),
            tag_ids: Vec::new(),
            tags: Vec::new(),
            is_mature: false,
            livechat_id: None,
            video_id: None,
            platform,
        }
    }
}

/// `GET /api/public/top_streams` body. A failing platform contributes `[]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopStreams {
    pub twitch: Vec<Stream>,
    pub kick: Vec<Stream>,
    pub youtube: Vec<Stream>,
}
