//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use cloudsentry_core::{Orchestrator, RegionFanout, ServiceCatalog};

/// State shared across handlers.
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub discovery: Arc<RegionFanout>,
    /// Where multipart credential uploads are stored.
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        discovery: Arc<RegionFanout>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            orchestrator,
            discovery,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        self.orchestrator.catalog()
    }
}
