use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::Engine;
use serde::{Deserialize, Serialize};

use super::pkce::CHALLENGE_METHOD;
use super::{build_url, post_token_form, OAuthError, OAuthProvider};
use crate::config::{Endpoints, KickConfig};
use crate::models::{Credential, Platform};
use crate::platforms::kick::KickApi;
use crate::platforms::PlatformError;

const SCOPES: &str = "user:read channel:read chat:write events:subscribe";

/// Kick's `state` carries the PKCE verifier back to the callback, so the
/// flow needs no server-side storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickState {
    #[serde(rename = "codeVerifier")]
    pub code_verifier: String,
}

impl KickState {
    pub fn new(code_verifier: impl Into<String>) -> Self {
        Self {
            code_verifier: code_verifier.into(),
        }
    }

    /// Base64url (unpadded) JSON.
    pub fn encode(&self) -> Result<String, OAuthError> {
        let json = serde_json::to_vec(self).map_err(|e| OAuthError::Decode(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Padded input is accepted too.
    pub fn decode(state: &str) -> Result<Self, OAuthError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(state.trim().trim_end_matches('='))
            .map_err(|_| OAuthError::InvalidState)?;
        let decoded: Self = serde_json::from_slice(&bytes).map_err(|_| OAuthError::InvalidState)?;
        if decoded.code_verifier.is_empty() {
            return Err(OAuthError::InvalidState);
        }
        Ok(decoded)
    }
}

pub struct KickOAuthProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_base: String,
    api: KickApi,
    http: reqwest::Client,
}

impl KickOAuthProvider {
    pub fn new(config: &KickConfig, endpoints: &Endpoints, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_base: endpoints.kick_auth_base.trim_end_matches('/').to_string(),
            api: KickApi::new(http.clone(), &endpoints.kick_api_base),
            http,
        }
    }

    fn token_url(&self) -> String {
        format!("{}/oauth/token", self.auth_base)
    }
}

#[async_trait]
impl OAuthProvider for KickOAuthProvider {
    fn platform(&self) -> Platform {
        Platform::Kick
    }

    fn authorization_url(&self, state: &str, code_challenge: Option<&str>) -> Result<String, OAuthError> {
        let challenge = code_challenge
            .ok_or_else(|| OAuthError::Config("Kick authorization requires a PKCE challenge".into()))?;
        build_url(
            &format!("{}/oauth/authorize", self.auth_base),
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPES),
                ("code_challenge", challenge),
                ("code_challenge_method", CHALLENGE_METHOD),
                ("state", state),
            ],
        )
    }

    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<Credential, OAuthError> {
        let verifier = code_verifier.ok_or(OAuthError::InvalidState)?;
        post_token_form(
            &self.http,
            Platform::Kick,
            &self.token_url(),
            &[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code_verifier", verifier),
                ("code", code),
            ],
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, OAuthError> {
        post_token_form(
            &self.http,
            Platform::Kick,
            &self.token_url(),
            &[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }

    async fn validate(&self, access_token: &str) -> Result<bool, OAuthError> {
        self.api.introspect(access_token).await.map_err(|e| match e {
            PlatformError::Upstream { platform, status, body } => OAuthError::Upstream { platform, status, body },
            other => OAuthError::Network(other.to_string()),
        })
    }

    async fn client_credentials(&self) -> Result<Credential, OAuthError> {
        post_token_form(
            &self.http,
            Platform::Kick,
            &self.token_url(),
            &[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::oauth::generate_code_verifier;

    #[test]
    fn state_survives_encoding() {
        let verifier = generate_code_verifier();
        let encoded = KickState::new(verifier.clone()).encode().unwrap();

        assert!(!encoded.contains('='));
        assert_eq!(KickState::decode(&encoded).unwrap().code_verifier, verifier);
    }

    #[test]
    fn state_uses_camel_case_field() {
        // {"codeVerifier":"abc"}
        let decoded = KickState::decode("eyJjb2RlVmVyaWZpZXIiOiJhYmMifQ==").unwrap();
        assert_eq!(decoded.code_verifier, "abc");
    }

    #[test]
    fn garbage_state_is_rejected() {
        assert!(matches!(KickState::decode("not base64!"), Err(OAuthError::InvalidState)));
        // valid base64url, not JSON
        assert!(matches!(KickState::decode("aGVsbG8"), Err(OAuthError::InvalidState)));
        // {"codeVerifier":""}
        assert!(matches!(
            KickState::decode("eyJjb2RlVmVyaWZpZXIiOiIifQ"),
            Err(OAuthError::InvalidState)
        ));
    }

    #[test]
    fn authorize_url_requires_challenge() {
        let provider = KickOAuthProvider::new(&KickConfig::default(), &Endpoints::default(), reqwest::Client::new());
        assert!(provider.authorization_url("s", None).is_err());

        let url = provider.authorization_url("s", Some("chal")).unwrap();
        assert!(url.starts_with("https://id.kick.com/oauth/authorize?"));
        assert!(url.contains("code_challenge=chal"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("scope=user%3Aread+channel%3Aread+chat%3Awrite+events%3Asubscribe"));
    }
}
