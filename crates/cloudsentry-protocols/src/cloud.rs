//! Cloud collaborator traits.
//!
//! Every call is a stateless request; implementations must be safe to share
//! across concurrently running workers.

use async_trait::async_trait;

use crate::error::CloudError;
use crate::types::{AlarmSpec, EnumerationMethod, Listing};

/// Region enumeration and per-service resource listing.
#[async_trait]
pub trait ResourceDirectory: Send + Sync {
    /// List every available region, queried through `anchor_region`.
    async fn list_regions(&self, anchor_region: &str) -> Result<Vec<String>, CloudError>;

    /// Invoke `method` against a client scoped to `region`.
    async fn enumerate(
        &self,
        method: EnumerationMethod,
        region: &str,
    ) -> Result<Listing, CloudError>;
}

/// An instance profile and the roles it wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceProfile {
    pub name: String,
    pub arn: String,
    pub roles: Vec<String>,
}

/// Compute identity bindings and IAM role/policy/profile state.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// ARN of the identity caller, used as a credentials check.
    async fn caller_identity(&self) -> Result<String, CloudError>;

    /// Instance-profile ARN bound to the instance, if any.
    ///
    /// Fails with [`CloudError::NotFound`] when the instance does not exist.
    async fn instance_profile_binding(
        &self,
        region: &str,
        instance_id: &str,
    ) -> Result<Option<String>, CloudError>;

    async fn get_instance_profile(&self, name: &str)
    -> Result<Option<InstanceProfile>, CloudError>;

    async fn role_exists(&self, role_name: &str) -> Result<bool, CloudError>;

    async fn create_role(&self, role_name: &str, trust_policy: &str) -> Result<(), CloudError>;

    async fn attached_policies(&self, role_name: &str) -> Result<Vec<String>, CloudError>;

    async fn attach_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), CloudError>;

    async fn create_instance_profile(&self, name: &str) -> Result<(), CloudError>;

    async fn add_role_to_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> Result<(), CloudError>;

    /// Association ids currently binding a profile to the instance.
    async fn profile_associations(
        &self,
        region: &str,
        instance_id: &str,
    ) -> Result<Vec<String>, CloudError>;

    async fn replace_profile_association(
        &self,
        region: &str,
        association_id: &str,
        profile_arn: &str,
    ) -> Result<(), CloudError>;

    async fn associate_profile(
        &self,
        region: &str,
        instance_id: &str,
        profile_arn: &str,
    ) -> Result<(), CloudError>;
}

/// Notification topics, alarms and dashboards.
///
/// Topic creation, alarm puts and dashboard puts are upserts by name.
#[async_trait]
pub trait AlertingApi: Send + Sync {
    /// Create (or fetch) a topic and return its ARN.
    async fn create_topic(&self, region: &str, name: &str) -> Result<String, CloudError>;

    async fn put_alarm(&self, region: &str, alarm: &AlarmSpec) -> Result<(), CloudError>;

    async fn put_dashboard(&self, region: &str, name: &str, body: &str)
    -> Result<(), CloudError>;
}
