//! Core error types.

use cloudsentry_protocols::{CloudError, ValidationErrors};
use thiserror::Error;

/// Errors from the service catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unsupported service: {0}")]
    NotFound(String),

    #[error("Service already registered: {0}")]
    AlreadyRegistered(String),
}

/// Errors that abort a whole discovery call.
///
/// Per-region failures never surface here; they are reported as
/// [`RegionError`](cloudsentry_protocols::RegionError)s instead.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to list regions: {0}")]
    Regions(#[source] CloudError),
}

/// Identity reconciliation failure for a single resource.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to fetch instance {resource_id}: {source}")]
    Describe {
        resource_id: String,
        #[source]
        source: CloudError,
    },

    #[error("{step} failed: {source}")]
    Identity {
        step: &'static str,
        #[source]
        source: CloudError,
    },

    #[error("Instance profile {0} is not available after creation")]
    ProfileUnavailable(String),

    #[error("Failed to bind instance profile to {resource_id}: {source}")]
    Binding {
        resource_id: String,
        #[source]
        source: CloudError,
    },
}

impl ReconcileError {
    pub(crate) fn identity(step: &'static str) -> impl FnOnce(CloudError) -> Self {
        move |source| Self::Identity { step, source }
    }
}

/// Fatal failures while creating the topic, alarms or dashboard.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to create SNS topic: {0}")]
    Topic(#[source] CloudError),

    #[error("Failed to create alarm {name}: {source}")]
    Alarm {
        name: String,
        #[source]
        source: CloudError,
    },

    #[error("Failed to create dashboard: {0}")]
    Dashboard(#[source] CloudError),

    #[error("Failed to encode dashboard body: {0}")]
    DashboardBody(String),
}

/// Top-level result error of a configuration run.
#[derive(Debug, Error)]
pub enum ConfigureError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl ConfigureError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudsentry_protocols::ValidationError;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound("EKS".to_string());
        assert_eq!(err.to_string(), "Unsupported service: EKS");
    }

    #[test]
    fn test_reconcile_error_display() {
        let err = ReconcileError::identity("attach_role_policy")(CloudError::api(
            "attach_role_policy",
            "AccessDenied",
        ));
        assert!(err.to_string().starts_with("attach_role_policy failed:"));
    }

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::Alarm {
            name: "i-1-CPUUtilization-Warning".to_string(),
            source: CloudError::api("put_metric_alarm", "throttled"),
        };
        assert!(err.to_string().contains("i-1-CPUUtilization-Warning"));
    }

    #[test]
    fn test_configure_error_kinds() {
        let err: ConfigureError =
            ValidationErrors::single(ValidationError::missing("region")).into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Missing required field: region");

        let err: ConfigureError =
            GenerationError::Dashboard(CloudError::NotFound("dash".to_string())).into();
        assert!(!err.is_validation());
    }
}
