//! HTTP routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::server::error::ApiError;
use crate::version::cache::{CacheStatus, VersionStorer};
use crate::version::service::VersionService;
use crate::version::types::{CacheKey, Channel, Platform};

#[derive(Debug, Default, Deserialize)]
pub struct VersionQuery {
    #[serde(default)]
    pub preview: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionResponse {
    pub platform: String,
    pub channel: String,
    pub version: String,
}

pub fn build_router<S: VersionStorer>(service: Arc<VersionService<S>>) -> Router {
    Router::new()
        .route("/version/{platform}", get(get_version::<S>))
        .route("/cache/status", get(cache_status::<S>))
        .route("/health", get(health))
        .with_state(service)
}

async fn get_version<S: VersionStorer>(
    State(service): State<Arc<VersionService<S>>>,
    Path(platform): Path<String>,
    Query(query): Query<VersionQuery>,
) -> Result<Json<VersionResponse>, ApiError> {
    let platform = platform
        .parse::<Platform>()
        .map_err(|()| ApiError::InvalidPlatform(platform.clone()))?;
    let key = CacheKey::new(platform, Channel::from_preview(query.preview));
    if !service.keys().contains(&key) {
        return Err(ApiError::UntrackedKey(key.to_string()));
    }

    let version = service.lookup(key).await?;

    Ok(Json(VersionResponse {
        platform: key.platform.to_string(),
        channel: key.channel.to_string(),
        version,
    }))
}

async fn cache_status<S: VersionStorer>(
    State(service): State<Arc<VersionService<S>>>,
) -> Result<Json<CacheStatus>, ApiError> {
    Ok(Json(service.status()?))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}
