use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    cache: &'static str,
}

/// Liveness plus a cache ping. A dead cache degrades the service, it does not stop it.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let cache_ok = state.cache.backend().ping().await;
    HttpResponse::Ok().json(HealthResponse {
        status: if cache_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        cache: if cache_ok { "healthy" } else { "unhealthy" },
    })
}
