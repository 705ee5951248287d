use actix_web::{web, HttpResponse};

use crate::app_state::AppState;
use crate::error::Result;
use crate::session::Session;

/// Live followed channels from every signed-in platform, most viewers first.
pub async fn following(state: web::Data<AppState>, session: Session) -> HttpResponse {
    HttpResponse::Ok().json(state.following.all(session.id()).await)
}

pub async fn twitch_following(state: web::Data<AppState>, session: Session) -> Result<HttpResponse> {
    let streams = state.following.twitch(session.id()).await?;
    Ok(HttpResponse::Ok().json(streams))
}

pub async fn youtube_subscriptions(state: web::Data<AppState>, session: Session) -> Result<HttpResponse> {
    let streams = state.following.youtube(session.id()).await?;
    Ok(HttpResponse::Ok().json(streams))
}
