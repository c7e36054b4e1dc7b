//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::http::catalog::{health, list_metrics, list_regions, list_resources, list_services};
use crate::http::configure::{configure, configure_stream};
use crate::state::AppState;

/// Build the application router.
///
/// ```text
/// /api
///   GET  /api/services
///   GET  /api/regions
///   GET  /api/resources/{service}
///   GET  /api/metrics/{service}
///   POST /api/configure
///   POST /api/configure/stream
///
/// /health
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/services", get(list_services))
        .route("/regions", get(list_regions))
        .route("/resources/{service}", get(list_resources))
        .route("/metrics/{service}", get(list_metrics))
        .route("/configure", post(configure))
        .route("/configure/stream", post(configure_stream))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
