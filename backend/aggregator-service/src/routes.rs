//! Route configuration

use actix_web::{web, HttpResponse};

use crate::handlers::{auth, debug, health, public, status, user};
use crate::models::Platform;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics_handler))
        .service(
            web::scope("/api")
                .route("/search", web::get().to(public::search))
                .service(
                    web::scope("/auth")
                        .route("/status", web::get().to(status::login_status))
                        .route("/status/public", web::get().to(status::public_status))
                        .configure(twitch_auth)
                        .configure(google_auth)
                        .configure(kick_auth),
                )
                .service(
                    web::scope("/user")
                        .route("/following", web::get().to(user::following))
                        .route("/twitch/following", web::get().to(user::twitch_following))
                        .route("/google/subscriptions", web::get().to(user::youtube_subscriptions)),
                )
                .service(
                    web::scope("/public")
                        .route("/top_streams", web::get().to(public::top_streams))
                        .route("/{platform}/top_streams", web::get().to(public::platform_top_streams)),
                ),
        );
}

/// `/api/debug/cache/*`, mounted only on request.
pub fn configure_debug_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/debug/cache")
            .route("/keys", web::get().to(debug::keys))
            .route("/get", web::get().to(debug::get))
            .route("/flush", web::post().to(debug::flush)),
    );
}

fn twitch_auth(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/twitch")
            .app_data(web::Data::new(Platform::Twitch))
            .route("/login", web::get().to(auth::login))
            .route("/callback", web::get().to(auth::callback))
            .route("/logout", web::get().to(auth::logout))
            .route("/oauth/refresh", web::post().to(auth::refresh))
            .route("/oauth/public_token", web::get().to(auth::public_token))
            .route("/authenticated", web::get().to(auth::authenticated)),
    );
}

fn google_auth(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/google")
            .app_data(web::Data::new(Platform::Youtube))
            .route("/authorize", web::get().to(auth::login))
            .route("/oauth2callback", web::get().to(auth::callback))
            .route("/logout", web::get().to(auth::logout))
            .route("/oauth/refresh", web::post().to(auth::refresh))
            .route("/authenticated", web::get().to(auth::authenticated)),
    );
}

fn kick_auth(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/kick")
            .app_data(web::Data::new(Platform::Kick))
            .route("/oauth", web::get().to(auth::login))
            .route("/oauth/callback", web::get().to(auth::callback))
            .route("/clear", web::get().to(auth::logout))
            .route("/oauth/refresh", web::post().to(auth::refresh))
            .route("/oauth/public_token", web::get().to(auth::public_token))
            .route("/authenticated", web::get().to(auth::authenticated)),
    );
}

async fn metrics_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(crate::metrics::gather_metrics())
}
