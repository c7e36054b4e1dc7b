//! Telemetry agent provisioning configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Agent provisioning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Login user on the target hosts.
    #[serde(default = "default_remote_user")]
    pub remote_user: String,

    /// Local install script transferred to each target.
    #[serde(default = "default_install_script")]
    pub install_script: PathBuf,

    /// Absolute path the script is uploaded to.
    #[serde(default = "default_remote_script_path")]
    pub remote_script_path: String,

    /// Binary whose presence marks the agent as installed.
    #[serde(default = "default_agent_binary")]
    pub agent_binary: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Number of targets provisioned concurrently; 1 is sequential.
    #[serde(default = "default_max_parallel_targets")]
    pub max_parallel_targets: usize,
}

impl AgentConfig {
    /// Shell command reporting `installed` or `not installed`.
    pub fn probe_command(&self) -> String {
        format!(
            "if [ -x {} ]; then echo 'installed'; else echo 'not installed'; fi",
            self.agent_binary
        )
    }

    /// Shell command running the uploaded script with elevated privileges.
    pub fn install_command(&self) -> String {
        format!(
            "chmod +x {path} && sudo bash {path}",
            path = self.remote_script_path
        )
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            remote_user: default_remote_user(),
            install_script: default_install_script(),
            remote_script_path: default_remote_script_path(),
            agent_binary: default_agent_binary(),
            connect_timeout_secs: default_connect_timeout(),
            command_timeout_secs: default_command_timeout(),
            max_parallel_targets: default_max_parallel_targets(),
        }
    }
}

fn default_remote_user() -> String {
    "ubuntu".to_string()
}

fn default_install_script() -> PathBuf {
    PathBuf::from("scripts/install_cloudwatch_agent.sh")
}

fn default_remote_script_path() -> String {
    "/home/ubuntu/install_cloudwatchagent.sh".to_string()
}

fn default_agent_binary() -> String {
    "/opt/aws/amazon-cloudwatch-agent/bin/amazon-cloudwatch-agent-ctl".to_string()
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_command_timeout() -> u64 {
    600
}

fn default_max_parallel_targets() -> usize {
    1
}
