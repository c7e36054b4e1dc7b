//! # CloudSentry API
//!
//! HTTP boundary of the orchestrator.
//!
//! ```text
//! GET  /api/services             - catalog service identifiers
//! GET  /api/regions              - regions visible through the anchor region
//! GET  /api/resources/{service}  - live resources across every region
//! GET  /api/metrics/{service}    - catalog metrics of one service
//! POST /api/configure            - run one configuration (JSON or multipart)
//! POST /api/configure/stream     - same, reporting progress as server-sent events
//! GET  /health                   - liveness
//! ```

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::AppState;

#[cfg(test)]
mod test_support;
