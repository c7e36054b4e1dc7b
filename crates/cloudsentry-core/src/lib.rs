//! # CloudSentry Core
//!
//! Monitoring-configuration engine.
//!
//! ## Components
//!
//! - [`ServiceCatalog`] - per-service metric catalog and response translators
//! - [`RegionFanout`] - concurrent cross-region resource discovery
//! - [`AccessReconciler`] - role, policy and instance-profile reconciliation
//! - [`AgentProvisioner`] - idempotent telemetry agent installation
//! - [`MonitoringGenerator`] - topic, alarm and dashboard generation
//! - [`Orchestrator`] - request validation and step sequencing

pub mod access;
pub mod catalog;
pub mod context;
pub mod discovery;
pub mod error;
pub mod generate;
pub mod orchestrator;
pub mod progress;
pub mod provision;
pub mod request;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use access::AccessReconciler;
pub use catalog::{CatalogEntry, ResponseTranslator, ServiceCatalog};
pub use context::CallContext;
pub use discovery::{Discovery, RegionFanout};
pub use error::{CatalogError, ConfigureError, DiscoveryError, GenerationError, ReconcileError};
pub use generate::{MonitorNames, MonitoringGenerator};
pub use orchestrator::Orchestrator;
pub use progress::{ProgressEvent, ProgressReporter, ProgressStage};
pub use provision::AgentProvisioner;
pub use request::{ConfigureRequest, RequestedMetric, RequestedResource};
