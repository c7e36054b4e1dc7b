//! Remote command-execution transport.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Where and how to open an administrative session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub host: String,
    pub user: String,
    pub key_path: PathBuf,
}

impl RemoteTarget {
    pub fn new(host: impl Into<String>, user: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            key_path: key_path.into(),
        }
    }
}

/// Exit status and both output streams of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Stdout followed by stderr, separated when both are present.
    pub fn combined(&self) -> String {
        let mut result = String::new();
        if !self.stdout.is_empty() {
            result.push_str(&self.stdout);
        }
        if !self.stderr.is_empty() {
            if !result.is_empty() {
                result.push_str("\n--- stderr ---\n");
            }
            result.push_str(&self.stderr);
        }
        result
    }
}

/// Opens key-authenticated sessions.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    async fn open(&self, target: &RemoteTarget) -> Result<Box<dyn RemoteSession>, RemoteError>;
}

/// One open session against one host.
#[async_trait]
pub trait RemoteSession: Send {
    async fn exec(&mut self, command: &str) -> Result<CommandOutput, RemoteError>;

    async fn upload(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError>;

    async fn close(self: Box<Self>) -> Result<(), RemoteError>;
}
