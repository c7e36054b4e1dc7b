//! Identity reconciliation for compute instances.
//!
//! Ensures an instance runs with a role carrying every required monitoring
//! policy. Existing bindings are repaired in place (policies are only ever
//! added); instances without a usable binding get the conventional role and
//! instance profile created and bound.

use std::sync::Arc;
use std::time::Duration;

use cloudsentry_config::AccessConfig;
use cloudsentry_protocols::{AccessOutcome, AccessStatus, IdentityApi};
use tracing::{error, info, warn};

use crate::context::CallContext;
use crate::error::ReconcileError;

/// Trust policy letting EC2 assume the monitoring role.
pub const EC2_TRUST_POLICY: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":{"Service":"ec2.amazonaws.com"},"Action":"sts:AssumeRole"}]}"#;

/// Role, policy and instance-profile reconciler.
pub struct AccessReconciler {
    identity: Arc<dyn IdentityApi>,
    config: AccessConfig,
}

impl AccessReconciler {
    pub fn new(identity: Arc<dyn IdentityApi>, config: AccessConfig) -> Self {
        Self { identity, config }
    }

    /// Reconcile one instance, folding any failure into the outcome.
    pub async fn reconcile(&self, resource_id: &str, region: &str, ctx: &CallContext) -> AccessOutcome {
        match self.ensure_access(resource_id, region, ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(resource_id, region, "Access reconciliation failed: {}", e);
                AccessOutcome::failed(resource_id, e.to_string())
            }
        }
    }

    /// Ensure the instance has a role holding every required policy.
    pub async fn ensure_access(
        &self,
        resource_id: &str,
        region: &str,
        ctx: &CallContext,
    ) -> Result<AccessOutcome, ReconcileError> {
        let binding = ctx
            .run(
                "describe_instances",
                self.identity.instance_profile_binding(region, resource_id),
            )
            .await
            .map_err(|source| ReconcileError::Describe {
                resource_id: resource_id.to_string(),
                source,
            })?;

        if let Some(profile_arn) = binding {
            let profile_name = profile_arn.rsplit('/').next().unwrap_or(&profile_arn);
            let profile = ctx
                .run(
                    "get_instance_profile",
                    self.identity.get_instance_profile(profile_name),
                )
                .await
                .map_err(ReconcileError::identity("get_instance_profile"))?;

            if let Some(role) = profile.and_then(|p| p.roles.into_iter().next()) {
                let attached = self.attach_missing(&role, ctx).await?;
                let status = if attached.is_empty() {
                    AccessStatus::Verified
                } else {
                    AccessStatus::Updated
                };
                info!(resource_id, role = %role, added = attached.len(), "Instance role reconciled");
                return Ok(AccessOutcome {
                    resource_id: resource_id.to_string(),
                    status,
                    attached_policies: attached,
                    message: Some(format!("role {}", role)),
                });
            }
            warn!(resource_id, profile = %profile_name, "Bound instance profile has no role; rebinding");
        }

        let attached = self.create_and_bind(resource_id, region, ctx).await?;
        Ok(AccessOutcome {
            resource_id: resource_id.to_string(),
            status: AccessStatus::Created,
            attached_policies: attached,
            message: Some(format!(
                "bound instance profile {}",
                self.config.profile_name()
            )),
        })
    }

    /// Attach every required policy the role lacks; returns what was added.
    async fn attach_missing(
        &self,
        role: &str,
        ctx: &CallContext,
    ) -> Result<Vec<String>, ReconcileError> {
        let current = ctx
            .run(
                "list_attached_role_policies",
                self.identity.attached_policies(role),
            )
            .await
            .map_err(ReconcileError::identity("list_attached_role_policies"))?;

        let mut added = Vec::new();
        for policy in &self.config.required_policies {
            if current.contains(policy) || added.contains(policy) {
                continue;
            }
            ctx.run("attach_role_policy", self.identity.attach_policy(role, policy))
                .await
                .map_err(ReconcileError::identity("attach_role_policy"))?;
            added.push(policy.clone());
        }
        Ok(added)
    }

    async fn create_and_bind(
        &self,
        resource_id: &str,
        region: &str,
        ctx: &CallContext,
    ) -> Result<Vec<String>, ReconcileError> {
        let role = self.config.role_name.as_str();
        let profile_name = self.config.profile_name();

        let exists = ctx
            .run("get_role", self.identity.role_exists(role))
            .await
            .map_err(ReconcileError::identity("get_role"))?;
        if !exists {
            info!(role, "Creating monitoring role");
            ctx.run("create_role", self.identity.create_role(role, EC2_TRUST_POLICY))
                .await
                .map_err(ReconcileError::identity("create_role"))?;
        }

        let attached = self.attach_missing(role, ctx).await?;

        let mut profile = ctx
            .run(
                "get_instance_profile",
                self.identity.get_instance_profile(&profile_name),
            )
            .await
            .map_err(ReconcileError::identity("get_instance_profile"))?;
        if profile.is_none() {
            info!(profile = %profile_name, "Creating instance profile");
            ctx.run(
                "create_instance_profile",
                self.identity.create_instance_profile(&profile_name),
            )
            .await
            .map_err(ReconcileError::identity("create_instance_profile"))?;
            ctx.run(
                "add_role_to_instance_profile",
                self.identity.add_role_to_instance_profile(&profile_name, role),
            )
            .await
            .map_err(ReconcileError::identity("add_role_to_instance_profile"))?;

            ctx.sleep(Duration::from_secs(self.config.settle_delay_secs))
                .await
                .map_err(ReconcileError::identity("instance profile propagation"))?;

            profile = ctx
                .run(
                    "get_instance_profile",
                    self.identity.get_instance_profile(&profile_name),
                )
                .await
                .map_err(ReconcileError::identity("get_instance_profile"))?;
        }
        let profile = profile.ok_or_else(|| ReconcileError::ProfileUnavailable(profile_name.clone()))?;

        let binding_error = |source| ReconcileError::Binding {
            resource_id: resource_id.to_string(),
            source,
        };
        let associations = ctx
            .run(
                "describe_iam_instance_profile_associations",
                self.identity.profile_associations(region, resource_id),
            )
            .await
            .map_err(binding_error)?;
        match associations.first() {
            Some(association_id) => {
                ctx.run(
                    "replace_iam_instance_profile_association",
                    self.identity
                        .replace_profile_association(region, association_id, &profile.arn),
                )
                .await
                .map_err(binding_error)?;
            }
            None => {
                ctx.run(
                    "associate_iam_instance_profile",
                    self.identity
                        .associate_profile(region, resource_id, &profile.arn),
                )
                .await
                .map_err(binding_error)?;
            }
        }

        info!(resource_id, profile = %profile_name, "Instance profile bound");
        Ok(attached)
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
