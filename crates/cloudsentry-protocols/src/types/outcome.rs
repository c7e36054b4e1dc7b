//! Per-resource outcomes and the aggregate configuration result.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionStatus {
    AlreadyInstalled,
    Installed,
    Failed,
}

/// Result of the agent-install step for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionOutcome {
    pub resource_id: String,
    pub status: ProvisionStatus,
    pub output: String,
}

impl ProvisionOutcome {
    pub fn already_installed(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            status: ProvisionStatus::AlreadyInstalled,
            output: String::new(),
        }
    }

    pub fn installed(resource_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            status: ProvisionStatus::Installed,
            output: output.into(),
        }
    }

    pub fn failed(resource_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            status: ProvisionStatus::Failed,
            output: output.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ProvisionStatus::Failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessStatus {
    /// Bound role already held every required policy.
    Verified,
    /// Missing policies were attached to the bound role.
    Updated,
    /// Role and instance profile were created and bound.
    Created,
    Failed,
}

/// Result of identity reconciliation for one compute resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessOutcome {
    pub resource_id: String,
    pub status: AccessStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attached_policies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AccessOutcome {
    pub fn failed(resource_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            status: AccessStatus::Failed,
            attached_policies: Vec::new(),
            message: Some(message.into()),
        }
    }
}

/// Aggregate returned by one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationResult {
    #[serde(rename = "notificationTopicArn")]
    pub topic_arn: String,
    pub topic_name: String,
    pub dashboard_name: String,
    pub dashboard_url: String,
    pub alarms: Vec<String>,
    #[serde(default)]
    pub provisioning: Vec<ProvisionOutcome>,
    #[serde(default)]
    pub access: Vec<AccessOutcome>,
}
