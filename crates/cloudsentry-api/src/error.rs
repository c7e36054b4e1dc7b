//! API error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cloudsentry_core::{CatalogError, ConfigureError, DiscoveryError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to HTTP clients as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body or missing multipart configuration.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Configure(#[from] ConfigureError),

    #[error("Failed to store upload: {0}")]
    Upload(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Catalog(_) => StatusCode::BAD_REQUEST,
            Self::Discovery(DiscoveryError::Catalog(_)) => StatusCode::BAD_REQUEST,
            Self::Configure(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Discovery(_) | Self::Configure(_) | Self::Upload(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
