use actix_web::{web, HttpResponse};
use futures::future::join_all;

use crate::app_state::AppState;
use crate::models::{LoginStatus, LoginStatusResponse, Platform, PublicAccess, PublicAccessResponse};
use crate::session::Session;

/// Which platforms this session is signed in to, after the usual token checks.
pub async fn login_status(state: web::Data<AppState>, session: Session) -> HttpResponse {
    let (state, session) = (&state, &session);
    let checks = Platform::ALL.into_iter().map(|platform| async move {
        LoginStatus {
            platform: platform.label().to_string(),
            logged_in: state.credentials.is_logged_in(platform, session.id()).await,
        }
    });
    HttpResponse::Ok().json(LoginStatusResponse {
        data: join_all(checks).await,
        error: None,
    })
}

/// Whether unauthenticated calls can run. Missing app tokens are minted here.
pub async fn public_status(state: web::Data<AppState>) -> HttpResponse {
    let (twitch, kick) = tokio::join!(
        state.credentials.app_token(Platform::Twitch),
        state.credentials.app_token(Platform::Kick)
    );
    let data = vec![
        PublicAccess {
            platform: Platform::Twitch.label().to_string(),
            access_token_available: twitch.is_ok(),
        },
        PublicAccess {
            platform: Platform::Youtube.label().to_string(),
            access_token_available: state.clients.youtube.has_api_key(),
        },
        PublicAccess {
            platform: Platform::Kick.label().to_string(),
            access_token_available: kick.is_ok(),
        },
    ];
    HttpResponse::Ok().json(PublicAccessResponse { data, error: None })
}
