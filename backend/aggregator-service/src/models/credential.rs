//! OAuth credentials and the per-platform session record

use serde::{Deserialize, Serialize};

use crate::models::Platform;

/// Tokens older than this are re-checked against the provider.
pub const REVALIDATE_AFTER_SECS: i64 = 3600;

/// Treat a token as expired slightly before the provider does.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds as reported by the token endpoint; 0 when unknown.
    #[serde(default)]
    pub expires_in: i64,
    /// Unix seconds of the last successful provider-side validation.
    #[serde(default)]
    pub last_validated: i64,
    /// Unix seconds when the token was issued to us.
    #[serde(default)]
    pub obtained_at: i64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: Vec<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Credential {
    pub fn from_token_response(token: TokenResponse, now: i64) -> Self {
        Self {
            scope: token.scopes(),
            access_token: token.access_token,
            refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
            expires_in: token.expires_in,
            last_validated: now,
            obtained_at: now,
            token_type: token.token_type.unwrap_or_else(default_token_type),
        }
    }

    /// Fill in what a refresh response left out. Providers that do not
    /// rotate refresh tokens omit it, in which case the previous one stays valid.
    pub fn inheriting(mut self, previous: &Credential) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.refresh_token.clone();
        }
        if self.scope.is_empty() {
            self.scope = previous.scope.clone();
        }
        self
    }

    /// Mark the token as confirmed live by the provider at `now`.
    pub fn validated_at(mut self, now: i64) -> Self {
        self.last_validated = now;
        self
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_in > 0 && now >= self.obtained_at + self.expires_in - EXPIRY_SKEW_SECS
    }

    pub fn needs_validation(&self, now: i64) -> bool {
        now - self.last_validated >= REVALIDATE_AFTER_SECS
    }

    /// Seconds left before expiry, floored at zero.
    pub fn remaining_secs(&self, now: i64) -> i64 {
        (self.obtained_at + self.expires_in - now).max(0)
    }
}

/// Token endpoint body. Twitch, Google and Kick share the RFC 6749 shape but
/// disagree on `scope` (array vs space-delimited string).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    scope: Option<ScopeField>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ScopeField {
    List(Vec<String>),
    Joined(String),
}

impl TokenResponse {
    pub fn scopes(&self) -> Vec<String> {
        match &self.scope {
            Some(ScopeField::List(list)) => list.clone(),
            Some(ScopeField::Joined(joined)) => {
                joined.split_whitespace().map(str::to_string).collect()
            }
            None => Vec::new(),
        }
    }
}

/// Profile captured at login so later calls need no extra lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub id: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// Everything the session keeps for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSession {
    pub platform: Platform,
    pub credential: Credential,
    #[serde(default)]
    pub profile: Option<PlatformProfile>,
}

impl PlatformSession {
    pub fn new(platform: Platform, credential: Credential) -> Self {
        Self {
            platform,
            credential,
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: Option<PlatformProfile>) -> Self {
        self.profile = profile;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(json: serde_json::Value) -> TokenResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn accepts_array_and_string_scopes() {
        let twitch = token(serde_json::json!({
            "access_token": "a", "expires_in": 3600, "scope": ["user:read:follows"]
        }));
        assert_eq!(twitch.scopes(), vec!["user:read:follows"]);

        let kick = token(serde_json::json!({
            "access_token": "a", "scope": "user:read channel:read"
        }));
        assert_eq!(kick.scopes(), vec!["user:read", "channel:read"]);
    }

    #[test]
    fn expiry_and_validation_windows() {
        let cred = Credential::from_token_response(
            token(serde_json::json!({"access_token": "a", "expires_in": 3600})),
            1_000,
        );
        assert!(!cred.is_expired(1_000 + 3000));
        assert!(cred.is_expired(1_000 + 3541));
        assert!(!cred.needs_validation(1_000 + 3599));
        assert!(cred.needs_validation(1_000 + 3600));
        assert_eq!(cred.remaining_secs(1_000 + 600), 3000);
    }

    #[test]
    fn unknown_lifetime_never_expires_by_clock() {
        let cred = Credential::from_token_response(
            token(serde_json::json!({"access_token": "a"})),
            0,
        );
        assert!(!cred.is_expired(i64::MAX / 2));
        assert_eq!(cred.token_type, "bearer");
    }

    #[test]
    fn refresh_keeps_previous_refresh_token_when_not_rotated() {
        let original = Credential::from_token_response(
            token(serde_json::json!({
                "access_token": "old", "refresh_token": "r1", "expires_in": 3600,
                "scope": "youtube.force-ssl"
            })),
            0,
        );
        let next = Credential::from_token_response(
            token(serde_json::json!({"access_token": "new", "expires_in": 3600})),
            5_000,
        )
        .inheriting(&original);
        assert_eq!(next.access_token, "new");
        assert_eq!(next.refresh_token.as_deref(), Some("r1"));
        assert_eq!(next.last_validated, 5_000);
        assert_eq!(next.scope, vec!["youtube.force-ssl"]);
    }
}
