//! Cloud API and identity configuration.

use serde::{Deserialize, Serialize};

/// Managed policies a monitoring role must carry.
pub const REQUIRED_POLICIES: [&str; 6] = [
    "arn:aws:iam::aws:policy/AmazonEC2ReadOnlyAccess",
    "arn:aws:iam::aws:policy/AmazonSNSFullAccess",
    "arn:aws:iam::aws:policy/AmazonSSMFullAccess",
    "arn:aws:iam::aws:policy/AmazonSSMManagedInstanceCore",
    "arn:aws:iam::aws:policy/CloudWatchAgentServerPolicy",
    "arn:aws:iam::aws:policy/CloudWatchFullAccess",
];

/// Cloud API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Region used for region enumeration.
    #[serde(default = "default_anchor_region")]
    pub anchor_region: String,

    /// Per-call deadline for every cloud API request.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Upper bound on concurrent region workers; 0 means one per region.
    #[serde(default)]
    pub max_parallel_regions: usize,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            anchor_region: default_anchor_region(),
            call_timeout_secs: default_call_timeout(),
            max_parallel_regions: 0,
        }
    }
}

fn default_anchor_region() -> String {
    "us-east-1".to_string()
}

fn default_call_timeout() -> u64 {
    30
}

/// Identity reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default = "default_role_name")]
    pub role_name: String,

    /// Pause after creating an instance profile, before associating it.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: u64,

    #[serde(default = "default_required_policies")]
    pub required_policies: Vec<String>,
}

impl AccessConfig {
    /// Instance profile name wrapping the role.
    pub fn profile_name(&self) -> String {
        format!("{}Profile", self.role_name)
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            role_name: default_role_name(),
            settle_delay_secs: default_settle_delay(),
            required_policies: default_required_policies(),
        }
    }
}

fn default_role_name() -> String {
    "MonitoringRole".to_string()
}

fn default_settle_delay() -> u64 {
    10
}

fn default_required_policies() -> Vec<String> {
    REQUIRED_POLICIES.iter().map(|p| p.to_string()).collect()
}
