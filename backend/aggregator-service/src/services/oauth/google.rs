use async_trait::async_trait;
use reqwest::StatusCode;

use super::{build_url, post_token_form, OAuthError, OAuthProvider};
use crate::config::{Endpoints, GoogleConfig};
use crate::models::{Credential, Platform};

const SCOPES: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

/// Google OAuth for the YouTube Data API (offline access, so refreshable).
pub struct GoogleOAuthProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    accounts_base: String,
    oauth_base: String,
    http: reqwest::Client,
}

impl GoogleOAuthProvider {
    pub fn new(config: &GoogleConfig, endpoints: &Endpoints, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            accounts_base: endpoints.google_accounts_base.trim_end_matches('/').to_string(),
            oauth_base: endpoints.google_oauth_base.trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    fn authorization_url(&self, state: &str, _code_challenge: Option<&str>) -> Result<String, OAuthError> {
        build_url(
            &format!("{}/o/oauth2/v2/auth", self.accounts_base),
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("access_type", "offline"),
                ("include_granted_scopes", "true"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
    }

    async fn exchange_code(&self, code: &str, _code_verifier: Option<&str>) -> Result<Credential, OAuthError> {
        post_token_form(
            &self.http,
            Platform::Youtube,
            &format!("{}/token", self.oauth_base),
            &[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ],
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, OAuthError> {
        post_token_form(
            &self.http,
            Platform::Youtube,
            &format!("{}/token", self.oauth_base),
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ],
        )
        .await
    }

    /// `tokeninfo` answers 400 for expired or revoked tokens.
    async fn validate(&self, access_token: &str) -> Result<bool, OAuthError> {
        let response = self
            .http
            .get(format!("{}/tokeninfo", self.oauth_base))
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| OAuthError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Ok(false),
            status => Err(OAuthError::Upstream {
                platform: Platform::Youtube,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn revoke(&self, access_token: &str) -> Result<(), OAuthError> {
        let response = self
            .http
            .post(format!("{}/revoke", self.oauth_base))
            .form(&[("token", access_token)])
            .send()
            .await
            .map_err(|e| OAuthError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(OAuthError::Upstream {
                platform: Platform::Youtube,
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}
