//! IAM roles, policies and instance profiles, and their EC2 bindings.

use async_trait::async_trait;
use aws_sdk_ec2::types::{Filter, IamInstanceProfileSpecification};
use aws_sdk_sts::error::DisplayErrorContext;
use cloudsentry_protocols::{CloudError, IdentityApi, InstanceProfile};
use tracing::info;

use crate::AwsCloud;
use crate::error::sdk_error;

fn profile_spec(profile_arn: &str) -> IamInstanceProfileSpecification {
    IamInstanceProfileSpecification::builder()
        .arn(profile_arn)
        .build()
}

#[async_trait]
impl IdentityApi for AwsCloud {
    async fn caller_identity(&self) -> Result<String, CloudError> {
        let output = self
            .sts()
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| CloudError::Credentials(DisplayErrorContext(&e).to_string()))?;
        output
            .arn()
            .map(String::from)
            .ok_or_else(|| CloudError::UnexpectedResponse("caller identity without ARN".to_string()))
    }

    async fn instance_profile_binding(
        &self,
        region: &str,
        instance_id: &str,
    ) -> Result<Option<String>, CloudError> {
        let output = self
            .ec2(region)
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(sdk_error("DescribeInstances"))?;
        let instance = output
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .find(|i| i.instance_id() == Some(instance_id))
            .ok_or_else(|| CloudError::NotFound(format!("instance {}", instance_id)))?;
        Ok(instance
            .iam_instance_profile()
            .and_then(|p| p.arn())
            .map(String::from))
    }

    async fn get_instance_profile(
        &self,
        name: &str,
    ) -> Result<Option<InstanceProfile>, CloudError> {
        let result = self
            .iam()
            .get_instance_profile()
            .instance_profile_name(name)
            .send()
            .await;
        let output = match result {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_entity_exception()) => {
                return Ok(None);
            }
            Err(e) => return Err(sdk_error("GetInstanceProfile")(e)),
        };
        Ok(output.instance_profile().map(|p| InstanceProfile {
            name: p.instance_profile_name().to_string(),
            arn: p.arn().to_string(),
            roles: p.roles().iter().map(|r| r.role_name().to_string()).collect(),
        }))
    }

    async fn role_exists(&self, role_name: &str) -> Result<bool, CloudError> {
        match self.iam().get_role().role_name(role_name).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_entity_exception()) => {
                Ok(false)
            }
            Err(e) => Err(sdk_error("GetRole")(e)),
        }
    }

    async fn create_role(&self, role_name: &str, trust_policy: &str) -> Result<(), CloudError> {
        self.iam()
            .create_role()
            .role_name(role_name)
            .assume_role_policy_document(trust_policy)
            .send()
            .await
            .map_err(sdk_error("CreateRole"))?;
        info!(role = role_name, "Created IAM role");
        Ok(())
    }

    async fn attached_policies(&self, role_name: &str) -> Result<Vec<String>, CloudError> {
        let pages = self
            .iam()
            .list_attached_role_policies()
            .role_name(role_name)
            .into_paginator()
            .send()
            .try_collect()
            .await
            .map_err(sdk_error("ListAttachedRolePolicies"))?;
        Ok(pages
            .iter()
            .flat_map(|p| p.attached_policies())
            .filter_map(|p| p.policy_arn().map(String::from))
            .collect())
    }

    async fn attach_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), CloudError> {
        self.iam()
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(sdk_error("AttachRolePolicy"))?;
        Ok(())
    }

    async fn create_instance_profile(&self, name: &str) -> Result<(), CloudError> {
        self.iam()
            .create_instance_profile()
            .instance_profile_name(name)
            .send()
            .await
            .map_err(sdk_error("CreateInstanceProfile"))?;
        info!(profile = name, "Created instance profile");
        Ok(())
    }

    async fn add_role_to_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> Result<(), CloudError> {
        self.iam()
            .add_role_to_instance_profile()
            .instance_profile_name(profile_name)
            .role_name(role_name)
            .send()
            .await
            .map_err(sdk_error("AddRoleToInstanceProfile"))?;
        Ok(())
    }

    async fn profile_associations(
        &self,
        region: &str,
        instance_id: &str,
    ) -> Result<Vec<String>, CloudError> {
        let output = self
            .ec2(region)
            .describe_iam_instance_profile_associations()
            .filters(Filter::builder().name("instance-id").values(instance_id).build())
            .send()
            .await
            .map_err(sdk_error("DescribeIamInstanceProfileAssociations"))?;
        Ok(output
            .iam_instance_profile_associations()
            .iter()
            .filter_map(|a| a.association_id().map(String::from))
            .collect())
    }

    async fn replace_profile_association(
        &self,
        region: &str,
        association_id: &str,
        profile_arn: &str,
    ) -> Result<(), CloudError> {
        self.ec2(region)
            .replace_iam_instance_profile_association()
            .association_id(association_id)
            .iam_instance_profile(profile_spec(profile_arn))
            .send()
            .await
            .map_err(sdk_error("ReplaceIamInstanceProfileAssociation"))?;
        Ok(())
    }

    async fn associate_profile(
        &self,
        region: &str,
        instance_id: &str,
        profile_arn: &str,
    ) -> Result<(), CloudError> {
        self.ec2(region)
            .associate_iam_instance_profile()
            .instance_id(instance_id)
            .iam_instance_profile(profile_spec(profile_arn))
            .send()
            .await
            .map_err(sdk_error("AssociateIamInstanceProfile"))?;
        Ok(())
    }
}
