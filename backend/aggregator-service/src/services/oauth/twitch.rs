use async_trait::async_trait;
use reqwest::StatusCode;

use super::{build_url, post_token_form, OAuthError, OAuthProvider};
use crate::config::{Endpoints, TwitchConfig};
use crate::models::{Credential, Platform};

const SCOPES: &str = "user:read:follows";

pub struct TwitchOAuthProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_base: String,
    http: reqwest::Client,
}

impl TwitchOAuthProvider {
    pub fn new(config: &TwitchConfig, endpoints: &Endpoints, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_base: endpoints.twitch_auth_base.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.auth_base)
    }
}

#[async_trait]
impl OAuthProvider for TwitchOAuthProvider {
    fn platform(&self) -> Platform {
        Platform::Twitch
    }

    fn authorization_url(&self, state: &str, _code_challenge: Option<&str>) -> Result<String, OAuthError> {
        build_url(
            &format!("{}/oauth2/authorize", self.auth_base),
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
    }

    async fn exchange_code(&self, code: &str, _code_verifier: Option<&str>) -> Result<Credential, OAuthError> {
        post_token_form(
            &self.http,
            Platform::Twitch,
            &self.token_url(),
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, OAuthError> {
        post_token_form(
            &self.http,
            Platform::Twitch,
            &self.token_url(),
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }

    /// `GET /oauth2/validate` answers 200 for live tokens and 401 otherwise.
    async fn validate(&self, access_token: &str) -> Result<bool, OAuthError> {
        let response = self
            .http
            .get(format!("{}/oauth2/validate", self.auth_base))
            .header("Authorization", format!("OAuth {}", access_token))
            .send()
            .await
            .map_err(|e| OAuthError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED => Ok(false),
            status => Err(OAuthError::Upstream {
                platform: Platform::Twitch,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn client_credentials(&self) -> Result<Credential, OAuthError> {
        post_token_form(
            &self.http,
            Platform::Twitch,
            &self.token_url(),
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ],
        )
        .await
    }
}
