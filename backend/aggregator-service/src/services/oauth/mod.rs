//! OAuth adapters, one per platform
//!
//! Each adapter knows its provider's authorize URL, token grants and how to
//! check a token is still alive. Session handling lives elsewhere.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

pub mod google;
pub mod kick;
pub mod pkce;
pub mod state_store;
pub mod twitch;

pub use google::GoogleOAuthProvider;
pub use kick::{KickOAuthProvider, KickState};
pub use pkce::{generate_code_challenge, generate_code_verifier};
pub use state_store::{OAuthState, OAuthStateStore};
pub use twitch::TwitchOAuthProvider;

use crate::config::Config;
use crate::metrics::record_upstream;
use crate::models::{Credential, Platform, TokenResponse};

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("{platform} token endpoint returned {status}: {body}")]
    Upstream {
        platform: Platform,
        status: u16,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Token response could not be decoded: {0}")]
    Decode(String),

    #[error("Invalid state parameter")]
    InvalidState,

    #[error("Could not persist OAuth state")]
    StateStore,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} does not support this grant")]
    Unsupported(Platform),

    #[error("PKCE error: {0}")]
    Pkce(#[from] pkce::PkceError),
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn platform(&self) -> Platform;

    /// Consent-screen URL. `code_challenge` is only used by PKCE providers.
    fn authorization_url(&self, state: &str, code_challenge: Option<&str>) -> Result<String, OAuthError>;

    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<Credential, OAuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, OAuthError>;

    /// `Ok(false)` when the provider reports the token dead.
    async fn validate(&self, access_token: &str) -> Result<bool, OAuthError>;

    /// App-level token for unauthenticated public calls.
    async fn client_credentials(&self) -> Result<Credential, OAuthError> {
        Err(OAuthError::Unsupported(self.platform()))
    }

    async fn revoke(&self, _access_token: &str) -> Result<(), OAuthError> {
        Ok(())
    }
}

/// POST a form to a token endpoint and decode the RFC 6749 response.
pub(crate) async fn post_token_form(
    http: &reqwest::Client,
    platform: Platform,
    url: &str,
    form: &[(&str, &str)],
) -> Result<Credential, OAuthError> {
    let response = http
        .post(url)
        .form(form)
        .send()
        .await
        .map_err(|e| OAuthError::Network(format!("{} token request failed: {}", platform, e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(%platform, status = status.as_u16(), "Token endpoint rejected request");
        record_upstream(platform, "http_error");
        return Err(OAuthError::Upstream {
            platform,
            status: status.as_u16(),
            body,
        });
    }

    record_upstream(platform, "ok");
    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| OAuthError::Decode(e.to_string()))?;
    Ok(Credential::from_token_response(
        token,
        chrono::Utc::now().timestamp(),
    ))
}

/// Append query parameters to a base URL.
pub(crate) fn build_url(base: &str, params: &[(&str, &str)]) -> Result<String, OAuthError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| OAuthError::Config(format!("invalid authorize URL {}: {}", base, e)))?;
    url.query_pairs_mut().extend_pairs(params);
    Ok(url.to_string())
}

/// The three adapters, built once from config.
pub struct OAuthProviders {
    pub twitch: TwitchOAuthProvider,
    pub google: GoogleOAuthProvider,
    pub kick: KickOAuthProvider,
}

impl OAuthProviders {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            twitch: TwitchOAuthProvider::new(&config.twitch, &config.endpoints, http.clone()),
            google: GoogleOAuthProvider::new(&config.google, &config.endpoints, http.clone()),
            kick: KickOAuthProvider::new(&config.kick, &config.endpoints, http),
        }
    }

    pub fn get(&self, platform: Platform) -> &dyn OAuthProvider {
        match platform {
            Platform::Twitch => &self.twitch,
            Platform::Youtube => &self.google,
            Platform::Kick => &self.kick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_encodes_params() {
        let url = build_url(
            "https://id.twitch.tv/oauth2/authorize",
            &[("scope", "user:read:follows"), ("redirect_uri", "http://localhost:8000/cb")],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://id.twitch.tv/oauth2/authorize?scope=user%3Aread%3Afollows&redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fcb"
        );
        assert!(build_url("not a url", &[]).is_err());
    }
}
