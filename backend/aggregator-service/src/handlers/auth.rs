//! OAuth login, callback, refresh and logout routes
//!
//! The same handlers serve all three platforms; each route scope registers
//! its `Platform` as app data. Twitch and Google carry a server-issued CSRF
//! token in `state`, Kick carries its PKCE verifier there instead.

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::models::{Platform, PlatformProfile, PlatformSession};
use crate::services::oauth::{generate_code_challenge, generate_code_verifier, KickState, OAuthError};
use crate::session::Session;

#[derive(Debug, Serialize)]
pub struct LoginUrl {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenStatus {
    pub platform: Platform,
    pub expires_in: i64,
    pub scope: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AppTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct AuthenticatedResponse {
    pub platform: Platform,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<PlatformProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Build the provider consent URL and hand it to the frontend.
pub async fn login(state: web::Data<AppState>, session: Session, platform: web::Data<Platform>) -> Result<HttpResponse> {
    let platform = *platform.get_ref();
    let provider = state.credentials.provider(platform);
    let url = match platform {
        Platform::Kick => {
            let verifier = generate_code_verifier();
            let challenge = generate_code_challenge(&verifier).map_err(OAuthError::from)?;
            let state_param = KickState::new(verifier).encode()?;
            provider.authorization_url(&state_param, Some(&challenge))?
        }
        Platform::Twitch | Platform::Youtube => {
            let token = state.oauth_states.issue(platform).await?;
            provider.authorization_url(&token, None)?
        }
    };

    info!(%platform, "Starting OAuth flow");
    Ok(HttpResponse::Ok()
        .cookie(state.sessions.cookie(&session))
        .json(LoginUrl { url }))
}

/// Provider redirect target. Always answers with a redirect to the frontend,
/// carrying either the success marker or an error code.
pub async fn callback(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<CallbackQuery>,
    platform: web::Data<Platform>,
) -> HttpResponse {
    let platform = *platform.get_ref();
    let frontend = state.config.app.frontend_url.trim_end_matches('/');
    let location = match complete_login(&state, &session, platform, query.into_inner()).await {
        Ok(()) => {
            info!(%platform, "OAuth login completed");
            format!("{}/auth/success?platform={}", frontend, platform)
        }
        Err(code) => {
            warn!(%platform, error = %code, "OAuth callback rejected");
            format!("{}?error={}", frontend, urlencoding::encode(&code))
        }
    };

    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(state.sessions.cookie(&session))
        .finish()
}

/// Error codes here end up in the frontend URL.
async fn complete_login(
    state: &AppState,
    session: &Session,
    platform: Platform,
    query: CallbackQuery,
) -> std::result::Result<(), String> {
    if let Some(error) = query.error.filter(|e| !e.is_empty()) {
        return Err(error);
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| "missing_code".to_string())?;
    let state_param = query
        .state
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing_state".to_string())?;

    let code_verifier = match platform {
        Platform::Kick => Some(
            KickState::decode(&state_param)
                .map_err(|_| "invalid_state".to_string())?
                .code_verifier,
        ),
        Platform::Twitch | Platform::Youtube => {
            if !state.oauth_states.consume(&state_param, platform).await {
                return Err("invalid_state".to_string());
            }
            None
        }
    };

    let credential = state
        .credentials
        .provider(platform)
        .exchange_code(&code, code_verifier.as_deref())
        .await
        .map_err(|e| {
            warn!(%platform, error = %e, "Code exchange failed");
            "token_exchange_failed".to_string()
        })?;

    let profile = match state.clients.profile(platform, &credential.access_token).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(%platform, error = %e, "Profile lookup failed, continuing without it");
            None
        }
    };

    let record = PlatformSession::new(platform, credential).with_profile(profile);
    state
        .credentials
        .store(session.id(), &record)
        .await
        .map_err(|_| "session_store_failed".to_string())
}

/// Revoke (Google) and forget the platform's credential.
pub async fn logout(state: web::Data<AppState>, session: Session, platform: web::Data<Platform>) -> HttpResponse {
    let platform = *platform.get_ref();
    let message = if state.credentials.logout(platform, session.id()).await {
        format!("{} credentials have been cleared", platform.label())
    } else {
        format!("No {} credentials found in session", platform.label())
    };
    HttpResponse::Ok().json(MessageResponse { message })
}

pub async fn refresh(state: web::Data<AppState>, session: Session, platform: web::Data<Platform>) -> Result<HttpResponse> {
    let platform = *platform.get_ref();
    let record = state.credentials.refresh(platform, session.id()).await?;
    let now = chrono::Utc::now().timestamp();
    Ok(HttpResponse::Ok().json(TokenStatus {
        platform,
        expires_in: record.credential.remaining_secs(now),
        scope: record.credential.scope,
    }))
}

/// Server-wide app token, minted on demand.
pub async fn public_token(state: web::Data<AppState>, platform: web::Data<Platform>) -> Result<HttpResponse> {
    let platform = *platform.get_ref();
    if platform == Platform::Youtube {
        return Err(AppError::Validation("YouTube public calls use the API key".into()));
    }
    let credential = state.credentials.app_credential(platform).await?;
    let now = chrono::Utc::now().timestamp();
    Ok(HttpResponse::Ok().json(AppTokenResponse {
        expires_in: credential.remaining_secs(now),
        access_token: credential.access_token,
        token_type: credential.token_type,
    }))
}

/// Login state plus the stored profile; tokens never leave the server.
pub async fn authenticated(state: web::Data<AppState>, session: Session, platform: web::Data<Platform>) -> HttpResponse {
    let platform = *platform.get_ref();
    let now = chrono::Utc::now().timestamp();
    let body = match state.credentials.ensure_valid_token(platform, session.id()).await {
        Ok(record) => AuthenticatedResponse {
            platform,
            authenticated: true,
            expires_in: Some(record.credential.remaining_secs(now)),
            profile: record.profile,
        },
        Err(_) => AuthenticatedResponse {
            platform,
            authenticated: false,
            profile: None,
            expires_in: None,
        },
    };
    HttpResponse::Ok().json(body)
}
