//! Cache inspection, mounted only when `APP_DEBUG_ROUTES` is set.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app_state::AppState;
use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct KeysQuery {
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

fn default_pattern() -> String {
    "*".to_string()
}

#[derive(Debug, Deserialize)]
pub struct GetQuery {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ValueResponse {
    pub key: String,
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub message: String,
    pub deleted: usize,
}

pub async fn keys(state: web::Data<AppState>, query: web::Query<KeysQuery>) -> Result<HttpResponse> {
    let mut keys = state
        .cache
        .backend()
        .keys(&query.pattern)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    keys.sort();
    info!(pattern = %query.pattern, count = keys.len(), "Listed cache keys");
    Ok(HttpResponse::Ok().json(KeysResponse {
        count: keys.len(),
        keys,
    }))
}

/// Raw entry; JSON payloads are returned parsed, anything else as a string.
pub async fn get(state: web::Data<AppState>, query: web::Query<GetQuery>) -> Result<HttpResponse> {
    let raw = state
        .cache
        .backend()
        .get_raw(&query.key)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let value = raw.map(|raw| serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw)));
    Ok(HttpResponse::Ok().json(ValueResponse {
        key: query.into_inner().key,
        value,
    }))
}

pub async fn flush(state: web::Data<AppState>) -> Result<HttpResponse> {
    let deleted = state
        .cache
        .backend()
        .delete_matching("*")
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    info!(deleted, "Flushed cache");
    Ok(HttpResponse::Ok().json(FlushResponse {
        message: "Cache flushed successfully".to_string(),
        deleted,
    }))
}
