//! Service configuration
//!
//! Everything comes from the environment (after loading `.env`), grouped by
//! prefix: `APP_`, `REDIS_`, `HTTP_`, `TWITCH_`, `GOOGLE_`, `KICK_` and
//! `UPSTREAM_` for provider base URLs.

use rand::RngCore;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub app: AppConfig,
    pub redis: RedisConfig,
    pub http: HttpConfig,
    pub twitch: TwitchConfig,
    pub google: GoogleConfig,
    pub kick: KickConfig,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Where OAuth callbacks redirect the browser.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// HMAC key for the session cookie.
    #[serde(default)]
    pub session_secret: String,

    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    #[serde(default)]
    pub cookie_secure: bool,

    /// Mounts `/api/debug/cache/*`.
    #[serde(default)]
    pub debug_routes: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedisConfig {
    /// Falls back to the in-process cache when unset.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    #[serde(default = "default_probe_client_timeout_secs")]
    pub probe_client_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitchConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_twitch_redirect_uri")]
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_google_redirect_uri")]
    pub redirect_uri: String,

    /// Data API key for unauthenticated YouTube calls.
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KickConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_kick_redirect_uri")]
    pub redirect_uri: String,
}

/// Upstream base URLs, overridable for staging and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_twitch_auth_base")]
    pub twitch_auth_base: String,

    #[serde(default = "default_twitch_api_base")]
    pub twitch_api_base: String,

    #[serde(default = "default_google_accounts_base")]
    pub google_accounts_base: String,

    #[serde(default = "default_google_oauth_base")]
    pub google_oauth_base: String,

    #[serde(default = "default_youtube_api_base")]
    pub youtube_api_base: String,

    #[serde(default = "default_youtube_web_base")]
    pub youtube_web_base: String,

    #[serde(default = "default_kick_auth_base")]
    pub kick_auth_base: String,

    #[serde(default = "default_kick_api_base")]
    pub kick_api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        let mut app: AppConfig = envy::prefixed("APP_").from_env()?;
        if app.session_secret.is_empty() {
            warn!("APP_SESSION_SECRET not set; generated an ephemeral key, sessions will not survive restarts");
            app.session_secret = random_secret();
        }

        let config = Self {
            app,
            redis: envy::prefixed("REDIS_").from_env()?,
            http: envy::prefixed("HTTP_").from_env()?,
            twitch: envy::prefixed("TWITCH_").from_env()?,
            google: envy::prefixed("GOOGLE_").from_env()?,
            kick: envy::prefixed("KICK_").from_env()?,
            endpoints: envy::prefixed("UPSTREAM_").from_env()?,
        };

        for missing in config.missing_credentials() {
            warn!("{} is not set; the matching platform calls will fail", missing);
        }

        Ok(config)
    }

    /// Names of provider credentials left empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let checks = [
            ("TWITCH_CLIENT_ID", &self.twitch.client_id),
            ("TWITCH_CLIENT_SECRET", &self.twitch.client_secret),
            ("GOOGLE_CLIENT_ID", &self.google.client_id),
            ("GOOGLE_CLIENT_SECRET", &self.google.client_secret),
            ("GOOGLE_API_KEY", &self.google.api_key),
            ("KICK_CLIENT_ID", &self.kick.client_id),
            ("KICK_CLIENT_SECRET", &self.kick.client_secret),
        ];
        checks
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_url: default_frontend_url(),
            session_secret: String::new(),
            session_ttl_secs: default_session_ttl_secs(),
            cookie_secure: false,
            debug_routes: false,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            probe_client_timeout_secs: default_probe_client_timeout_secs(),
        }
    }
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_twitch_redirect_uri(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_google_redirect_uri(),
            api_key: String::new(),
        }
    }
}

impl Default for KickConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_kick_redirect_uri(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            twitch_auth_base: default_twitch_auth_base(),
            twitch_api_base: default_twitch_api_base(),
            google_accounts_base: default_google_accounts_base(),
            google_oauth_base: default_google_oauth_base(),
            youtube_api_base: default_youtube_api_base(),
            youtube_web_base: default_youtube_web_base(),
            kick_auth_base: default_kick_auth_base(),
            kick_api_base: default_kick_api_base(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_session_ttl_secs() -> u64 {
    7 * 24 * 3600
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_probe_timeout_secs() -> u64 {
    10
}

fn default_probe_client_timeout_secs() -> u64 {
    15
}

fn default_twitch_redirect_uri() -> String {
    "http://localhost:8000/api/auth/twitch/callback".to_string()
}

fn default_google_redirect_uri() -> String {
    "http://localhost:8000/api/auth/google/oauth2callback".to_string()
}

fn default_kick_redirect_uri() -> String {
    "http://localhost:8000/api/auth/kick/oauth/callback".to_string()
}

fn default_twitch_auth_base() -> String {
    "https://id.twitch.tv".to_string()
}

fn default_twitch_api_base() -> String {
    "https://api.twitch.tv/helix".to_string()
}

fn default_google_accounts_base() -> String {
    "https://accounts.google.com".to_string()
}

fn default_google_oauth_base() -> String {
    "https://oauth2.googleapis.com".to_string()
}

fn default_youtube_api_base() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_youtube_web_base() -> String {
    "https://www.youtube.com".to_string()
}

fn default_kick_auth_base() -> String {
    "https://id.kick.com".to_string()
}

fn default_kick_api_base() -> String {
    "https://api.kick.com/public/v1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn reads_prefixed_sections_with_defaults() {
        std::env::set_var("APP_PORT", "9090");
        std::env::set_var("APP_SESSION_SECRET", "s3cret");
        std::env::set_var("TWITCH_CLIENT_ID", "twitch-id");
        std::env::set_var("UPSTREAM_KICK_API_BASE", "http://127.0.0.1:1/kick");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.port, 9090);
        assert_eq!(config.app.session_secret, "s3cret");
        assert_eq!(config.app.frontend_url, "http://localhost:3000");
        assert_eq!(config.twitch.client_id, "twitch-id");
        assert_eq!(config.endpoints.kick_api_base, "http://127.0.0.1:1/kick");
        assert_eq!(config.endpoints.twitch_api_base, "https://api.twitch.tv/helix");
        assert_eq!(config.http.probe_client_timeout_secs, 15);

        for key in [
            "APP_PORT",
            "APP_SESSION_SECRET",
            "TWITCH_CLIENT_ID",
            "UPSTREAM_KICK_API_BASE",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn generates_session_secret_when_missing() {
        std::env::remove_var("APP_SESSION_SECRET");
        let config = Config::from_env().unwrap();
        assert_eq!(config.app.session_secret.len(), 64);
    }

    #[test]
    fn reports_missing_provider_credentials() {
        let mut config = Config::default();
        config.twitch.client_id = "id".into();
        let missing = config.missing_credentials();
        assert!(!missing.contains(&"TWITCH_CLIENT_ID"));
        assert!(missing.contains(&"GOOGLE_API_KEY"));
    }
}
