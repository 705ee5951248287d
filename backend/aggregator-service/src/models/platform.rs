use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Streaming platforms behind the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    Youtube,
    Kick,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Youtube, Platform::Twitch, Platform::Kick];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitch => "twitch",
            Platform::Youtube => "youtube",
            Platform::Kick => "kick",
        }
    }

    /// Label used by the auth status endpoints.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Twitch => "Twitch",
            Platform::Youtube => "Youtube",
            Platform::Kick => "Kick",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "twitch" => Ok(Platform::Twitch),
            "youtube" | "google" => Ok(Platform::Youtube),
            "kick" => Ok(Platform::Kick),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}
