//! # CloudSentry Protocols
//!
//! Data model and collaborator interfaces for the CloudSentry orchestrator.
//! Contains only types and trait definitions - no implementations.
//!
//! ## Collaborator Traits
//!
//! - [`ResourceDirectory`] - Region enumeration and per-service resource listing
//! - [`IdentityApi`] - Instance identity, role, policy and instance-profile state
//! - [`AlertingApi`] - Notification topics, alarms and dashboards
//! - [`RemoteShell`] - Key-authenticated remote command sessions

pub mod cloud;
pub mod error;
pub mod remote;
pub mod types;

pub use cloud::{AlertingApi, IdentityApi, InstanceProfile, ResourceDirectory};
pub use error::{CloudError, RemoteError, ValidationError, ValidationErrors};
pub use remote::{CommandOutput, RemoteSession, RemoteShell, RemoteTarget};
pub use types::*;
