//! Upstream provider clients
//!
//! One module per platform, each split into the raw REST client (`api`) and
//! the mapping into the unified records (`normalize`).

pub mod kick;
pub mod twitch;
pub mod youtube;

use reqwest::Response;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::config::Config;
use crate::metrics::record_upstream;
use crate::models::{Platform, PlatformProfile};

pub use kick::KickApi;
pub use twitch::TwitchApi;
pub use youtube::{YoutubeApi, YoutubeAuth};

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{platform} API returned {status}: {body}")]
    Upstream {
        platform: Platform,
        status: u16,
        body: String,
    },

    #[error("{platform} request failed: {source}")]
    Transport {
        platform: Platform,
        #[source]
        source: reqwest::Error,
    },

    #[error("{platform} response could not be decoded: {message}")]
    Decode { platform: Platform, message: String },

    #[error("{platform} is not configured: {message}")]
    NotConfigured { platform: Platform, message: String },
}

impl PlatformError {
    pub fn platform(&self) -> Platform {
        match self {
            PlatformError::Upstream { platform, .. }
            | PlatformError::Transport { platform, .. }
            | PlatformError::Decode { platform, .. }
            | PlatformError::NotConfigured { platform, .. } => *platform,
        }
    }

    /// Upstream HTTP status, when the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            PlatformError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;

pub(crate) fn transport(platform: Platform) -> impl FnOnce(reqwest::Error) -> PlatformError {
    move |source| {
        record_upstream(platform, "transport_error");
        PlatformError::Transport { platform, source }
    }
}

/// Turn a provider response into `T`, tagging non-2xx answers with status and body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    platform: Platform,
    response: Response,
) -> PlatformResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(%platform, status = status.as_u16(), "Upstream request failed");
        record_upstream(platform, "http_error");
        return Err(PlatformError::Upstream {
            platform,
            status: status.as_u16(),
            body,
        });
    }

    record_upstream(platform, "ok");
    response
        .json::<T>()
        .await
        .map_err(|e| PlatformError::Decode {
            platform,
            message: e.to_string(),
        })
}

pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("omniview/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// The three REST clients, built once from config.
#[derive(Clone)]
pub struct PlatformClients {
    pub twitch: TwitchApi,
    pub youtube: YoutubeApi,
    pub kick: KickApi,
}

impl PlatformClients {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        let probe_http = http_client(Duration::from_secs(config.http.probe_client_timeout_secs));
        Self {
            twitch: TwitchApi::new(http.clone(), &config.endpoints.twitch_api_base, &config.twitch.client_id),
            youtube: YoutubeApi::new(
                http.clone(),
                probe_http,
                &config.endpoints.youtube_api_base,
                &config.endpoints.youtube_web_base,
                &config.google.api_key,
                Duration::from_secs(config.http.probe_timeout_secs),
            ),
            kick: KickApi::new(http, &config.endpoints.kick_api_base),
        }
    }

    /// Account behind a user token, captured at login.
    pub async fn profile(&self, platform: Platform, token: &str) -> PlatformResult<Option<PlatformProfile>> {
        let profile = match platform {
            Platform::Twitch => self.twitch.current_user(token).await?.map(|user| PlatformProfile {
                id: user.id.unwrap_or_default(),
                login: user.login.unwrap_or_default(),
                display_name: user.display_name.unwrap_or_default(),
                profile_image_url: user.profile_image_url,
            }),
            Platform::Youtube => self.youtube.my_channel(token).await?.map(|channel| {
                let avatar = channel.avatar();
                let snippet = channel.snippet.unwrap_or_default();
                PlatformProfile {
                    id: channel.id.unwrap_or_default(),
                    login: snippet.custom_url.unwrap_or_default(),
                    display_name: snippet.title.unwrap_or_default(),
                    profile_image_url: avatar,
                }
            }),
            Platform::Kick => self.kick.current_user(token).await?.map(|user| PlatformProfile {
                id: user.id(),
                login: user.name.clone().unwrap_or_default(),
                display_name: user.name.unwrap_or_default(),
                profile_image_url: user.profile_picture,
            }),
        };
        Ok(profile.filter(|p| !p.id.is_empty()))
    }
}

/// Distinct non-empty ids in first-seen order.
pub(crate) fn distinct_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter()
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_string)
        .collect()
}
