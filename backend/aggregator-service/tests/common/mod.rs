#![allow(dead_code)]

use actix_web::cookie::Cookie;
use aggregator_service::config::{Config, Endpoints};
use aggregator_service::models::{Credential, Platform, PlatformProfile, PlatformSession};
use aggregator_service::AppState;
use std::sync::Arc;
use stream_cache::{MemoryBackend, StreamCache};

pub const FRONTEND_URL: &str = "http://frontend.test";

/// Config with every upstream pointed at one mock server.
pub fn test_config(upstream: &str) -> Config {
    let mut config = Config::default();
    config.app.session_secret = "integration-secret".to_string();
    config.app.frontend_url = FRONTEND_URL.to_string();

    config.twitch.client_id = "twitch-client".to_string();
    config.twitch.client_secret = "twitch-secret".to_string();
    config.google.client_id = "google-client".to_string();
    config.google.client_secret = "google-secret".to_string();
    config.google.api_key = "youtube-key".to_string();
    config.kick.client_id = "kick-client".to_string();
    config.kick.client_secret = "kick-secret".to_string();

    config.endpoints = Endpoints {
        twitch_auth_base: format!("{}/twitch-auth", upstream),
        twitch_api_base: format!("{}/helix", upstream),
        google_accounts_base: format!("{}/google-accounts", upstream),
        google_oauth_base: format!("{}/google-oauth", upstream),
        youtube_api_base: format!("{}/youtube/v3", upstream),
        youtube_web_base: format!("{}/youtube-web", upstream),
        kick_auth_base: format!("{}/kick-auth", upstream),
        kick_api_base: format!("{}/kick-api", upstream),
    };
    config
}

pub fn test_state(upstream: &str) -> AppState {
    AppState::new(test_config(upstream), StreamCache::in_memory())
}

/// State plus a handle on its cache, for inspecting what got stored.
pub fn test_state_with_backend(upstream: &str) -> (AppState, MemoryBackend) {
    let backend = MemoryBackend::new();
    let state = AppState::new(test_config(upstream), StreamCache::new(Arc::new(backend.clone())));
    (state, backend)
}

pub fn profile(id: &str, login: &str) -> PlatformProfile {
    PlatformProfile {
        id: id.to_string(),
        login: login.to_string(),
        display_name: login.to_string(),
        profile_image_url: None,
    }
}

/// A signed-in session holding `credential`, plus the cookie that selects it.
pub async fn seed_session(
    state: &AppState,
    platform: Platform,
    credential: Credential,
) -> (String, Cookie<'static>) {
    let session = state.sessions.resolve(None);
    state
        .credentials
        .store(session.id(), &PlatformSession::new(platform, credential))
        .await
        .expect("store credential");
    (session.id().to_string(), state.sessions.cookie(&session))
}

/// Token issued `age` seconds ago and last validated at the same moment.
pub fn credential_aged(access_token: &str, refresh_token: Option<&str>, age: i64) -> Credential {
    let issued = chrono::Utc::now().timestamp() - age;
    Credential {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_in: 14_400,
        last_validated: issued,
        obtained_at: issued,
        token_type: "bearer".to_string(),
        scope: vec!["user:read:follows".to_string()],
    }
}
