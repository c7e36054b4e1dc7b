//! Catalog and discovery handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use cloudsentry_protocols::{MetricDescriptor, ResourceRecord};
use serde_json::json;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/services
pub async fn list_services(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.catalog().services())
}

/// GET /api/regions
pub async fn list_regions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let ctx = state.discovery.context();
    Ok(Json(state.discovery.regions(&ctx).await?))
}

/// GET /api/resources/{service}
///
/// Region failures are logged by the fan-out engine and left out of the body.
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    Path(service): Path<String>,
) -> Result<Json<Vec<ResourceRecord>>, ApiError> {
    let ctx = state.discovery.context();
    let discovery = state.discovery.discover_all(&service, &ctx).await?;
    if !discovery.region_errors.is_empty() {
        warn!(
            service = %service,
            failed_regions = discovery.region_errors.len(),
            "Discovery finished with region errors"
        );
    }
    info!(service = %service, count = discovery.resources.len(), "Resources discovered");
    Ok(Json(discovery.resources))
}

/// GET /api/metrics/{service}
pub async fn list_metrics(
    State(state): State<Arc<AppState>>,
    Path(service): Path<String>,
) -> Result<Json<Vec<MetricDescriptor>>, ApiError> {
    Ok(Json(state.catalog().metrics(&service)?))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
