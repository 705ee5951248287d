use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::models::Platform;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn top_streams(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.top_streams.all().await)
}

/// `/api/public/{platform}/top_streams`; unlike the aggregate, failures surface.
pub async fn platform_top_streams(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let platform: Platform = path.into_inner().parse().map_err(AppError::NotFound)?;
    let streams = state.top_streams.for_platform(platform).await?;
    Ok(HttpResponse::Ok().json(streams))
}

pub async fn search(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> Result<HttpResponse> {
    let results = state.search.search_all_platforms(&query.q).await?;
    Ok(HttpResponse::Ok().json(results))
}
