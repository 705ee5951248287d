use serde::{Deserialize, Serialize};

use crate::models::Platform;

/// One channel match, normalized across platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamerSearchResult {
    pub platform: Platform,
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub profile_image_url: Option<String>,
    pub broadcaster_type: Option<String>,
    pub is_live: Option<bool>,
    pub live_viewer_count: Option<u64>,
}

/// Per-platform search outcome; `None` means no match or the platform failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub twitch: Option<StreamerSearchResult>,
    pub kick: Option<StreamerSearchResult>,
    pub youtube: Option<StreamerSearchResult>,
}
