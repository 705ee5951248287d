//! Credential lifecycle
//!
//! Every user-scoped upstream call goes through [`CredentialService::ensure_valid_token`],
//! which refreshes clock-expired tokens, re-validates stale ones at most once
//! an hour and drops a platform's credential when it cannot be recovered.

use std::sync::Arc;

use stream_cache::{ttl, CacheKey, StreamCache};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::{Credential, Platform, PlatformSession};
use crate::services::oauth::{OAuthProvider, OAuthProviders};
use crate::session::CredentialRepository;

pub struct CredentialService {
    repository: Arc<dyn CredentialRepository>,
    providers: Arc<OAuthProviders>,
    cache: StreamCache,
}

impl CredentialService {
    pub fn new(
        repository: Arc<dyn CredentialRepository>,
        providers: Arc<OAuthProviders>,
        cache: StreamCache,
    ) -> Self {
        Self {
            repository,
            providers,
            cache,
        }
    }

    pub fn provider(&self, platform: Platform) -> &dyn OAuthProvider {
        self.providers.get(platform)
    }

    /// Persist a freshly exchanged credential.
    pub async fn store(&self, session_id: &str, record: &PlatformSession) -> Result<()> {
        if self.repository.put(session_id, record).await {
            Ok(())
        } else {
            Err(AppError::Internal(format!(
                "could not persist {} credential",
                record.platform
            )))
        }
    }

    /// Stored record without any lifecycle checks.
    pub async fn current(&self, platform: Platform, session_id: &str) -> Option<PlatformSession> {
        self.repository.get(platform, session_id).await
    }

    /// A record whose token is usable right now.
    pub async fn ensure_valid_token(&self, platform: Platform, session_id: &str) -> Result<PlatformSession> {
        let record = self
            .repository
            .get(platform, session_id)
            .await
            .ok_or(AppError::NotAuthenticated(platform))?;
        let now = chrono::Utc::now().timestamp();

        if record.credential.is_expired(now) {
            info!(%platform, "Access token expired, refreshing");
            return self.refresh_record(session_id, record).await;
        }
        if !record.credential.needs_validation(now) {
            return Ok(record);
        }

        match self
            .provider(platform)
            .validate(&record.credential.access_token)
            .await
        {
            Ok(true) => {
                debug!(%platform, "Access token still valid");
                let record = PlatformSession {
                    credential: record.credential.clone().validated_at(now),
                    ..record
                };
                if !self.repository.put(session_id, &record).await {
                    warn!(%platform, "Could not persist validation timestamp");
                }
                Ok(record)
            }
            Ok(false) => {
                info!(%platform, "Provider rejected access token, refreshing");
                self.refresh_record(session_id, record).await
            }
            Err(e) => {
                warn!(%platform, error = %e, "Token validation failed, refreshing");
                self.refresh_record(session_id, record).await
            }
        }
    }

    /// Force a refresh of the stored credential.
    pub async fn refresh(&self, platform: Platform, session_id: &str) -> Result<PlatformSession> {
        let record = self
            .repository
            .get(platform, session_id)
            .await
            .ok_or(AppError::NotAuthenticated(platform))?;
        self.refresh_record(session_id, record).await
    }

    async fn refresh_record(&self, session_id: &str, record: PlatformSession) -> Result<PlatformSession> {
        let platform = record.platform;
        let Some(refresh_token) = record.credential.refresh_token.clone() else {
            self.repository.delete(platform, session_id).await;
            return Err(AppError::TokenRefreshFailed {
                platform,
                reason: "no refresh token stored".into(),
            });
        };

        match self.provider(platform).refresh(&refresh_token).await {
            Ok(fresh) => {
                let record = PlatformSession {
                    credential: fresh.inheriting(&record.credential),
                    ..record
                };
                if !self.repository.put(session_id, &record).await {
                    warn!(%platform, "Could not persist refreshed credential");
                }
                info!(%platform, "Refreshed access token");
                Ok(record)
            }
            Err(e) => {
                warn!(%platform, error = %e, "Token refresh failed, dropping credential");
                self.repository.delete(platform, session_id).await;
                Err(AppError::TokenRefreshFailed {
                    platform,
                    reason: e.to_string(),
                })
            }
        }
    }

    pub async fn is_logged_in(&self, platform: Platform, session_id: &str) -> bool {
        self.ensure_valid_token(platform, session_id).await.is_ok()
    }

    /// Revoke where the provider supports it, then forget the credential.
    /// Returns whether anything was stored.
    pub async fn logout(&self, platform: Platform, session_id: &str) -> bool {
        let Some(record) = self.repository.get(platform, session_id).await else {
            return false;
        };
        if let Err(e) = self
            .provider(platform)
            .revoke(&record.credential.access_token)
            .await
        {
            warn!(%platform, error = %e, "Token revocation failed");
        }
        self.repository.delete(platform, session_id).await;
        info!(%platform, "Logged out");
        true
    }

    /// Server-wide client-credentials token for public calls.
    pub async fn app_credential(&self, platform: Platform) -> Result<Credential> {
        let key = CacheKey::app_token(platform.as_str());
        if let Some(credential) = self.cache.get::<Credential>(&key).await {
            return Ok(credential);
        }

        let credential = self.provider(platform).client_credentials().await?;
        let lifetime = u64::try_from(credential.expires_in).unwrap_or(0);
        let ttl_secs = lifetime.saturating_sub(ttl::APP_TOKEN_MARGIN);
        if ttl_secs > 0 {
            self.cache.set(&key, &credential, ttl_secs).await;
        }
        info!(%platform, expires_in = lifetime, "Obtained app access token");
        Ok(credential)
    }

    pub async fn app_token(&self, platform: Platform) -> Result<String> {
        Ok(self.app_credential(platform).await?.access_token)
    }
}
