use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::version::error::LookupError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown platform: {0}")]
    InvalidPlatform(String),

    #[error("Key not tracked: {0}")]
    UntrackedKey(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPlatform(_) | ApiError::UntrackedKey(_) => StatusCode::BAD_REQUEST,
            ApiError::Lookup(LookupError::SourceUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Lookup(LookupError::Cache(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!("Request failed with {}: {}", status, self);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
