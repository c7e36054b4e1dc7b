//! Router fixture backed by in-memory collaborators.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::Response;
use cloudsentry_config::{Config, REQUIRED_POLICIES};
use cloudsentry_core::testing::{FakeAlerting, FakeDirectory, FakeHost, FakeIdentity, FakeShell};
use cloudsentry_core::{Orchestrator, RegionFanout, ServiceCatalog};
use cloudsentry_protocols::Listing;
use tempfile::TempDir;

use crate::http::routes::create_router;
use crate::state::AppState;

pub struct TestApp {
    pub router: Router,
    pub alerting: Arc<FakeAlerting>,
    pub shell: Arc<FakeShell>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }
}

pub fn directory() -> FakeDirectory {
    FakeDirectory::new(&["us-east-1", "eu-west-1", "ap-south-1"])
        .with_listing(
            "us-east-1",
            Listing::TableNames(vec!["orders".to_string()]),
        )
        .with_listing(
            "ap-south-1",
            Listing::TableNames(vec!["sessions".to_string()]),
        )
        .failing_region("eu-west-1")
}

pub fn test_app() -> TestApp {
    test_app_with(directory())
}

pub fn test_app_with(directory: FakeDirectory) -> TestApp {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("install.sh");
    std::fs::write(&script, "#!/bin/bash\necho install\n").unwrap();

    let mut config = Config::default();
    config.access.settle_delay_secs = 0;
    config.agent.install_script = script;

    let catalog = Arc::new(ServiceCatalog::builtin());
    let identity = Arc::new(
        FakeIdentity::new()
            .with_bound_instance("i-1", "MonitoringRoleProfile", Some("MonitoringRole"))
            .with_role("MonitoringRole", &REQUIRED_POLICIES),
    );
    let alerting = Arc::new(FakeAlerting::new());
    let shell = Arc::new(FakeShell::new().with_host("10.0.0.5", FakeHost::fresh()));

    let orchestrator = Arc::new(Orchestrator::new(
        catalog.clone(),
        identity,
        alerting.clone(),
        shell.clone(),
        &config,
    ));
    let discovery = Arc::new(RegionFanout::new(
        Arc::new(directory),
        catalog,
        "us-east-1",
    ));
    let state = Arc::new(AppState::new(
        orchestrator,
        discovery,
        dir.path().join("uploads"),
    ));

    TestApp {
        router: create_router(state),
        alerting,
        shell,
        dir,
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
