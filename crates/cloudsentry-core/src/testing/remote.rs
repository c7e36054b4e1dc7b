use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cloudsentry_protocols::{CommandOutput, RemoteError, RemoteSession, RemoteShell, RemoteTarget};

use super::lock;

/// Behavior of one fake host.
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    pub installed: bool,
    pub install_exit_status: i32,
    pub refuse_connection: bool,
}

impl FakeHost {
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn with_agent() -> Self {
        Self {
            installed: true,
            ..Self::default()
        }
    }

    pub fn broken_installer(exit_status: i32) -> Self {
        Self {
            install_exit_status: exit_status,
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            refuse_connection: true,
            ..Self::default()
        }
    }
}

/// Remote shell whose hosts are scripted in memory.
///
/// Every session action is appended to a shared log as
/// `open|exec|upload|close <host>[: detail]`.
#[derive(Default)]
pub struct FakeShell {
    hosts: HashMap<String, FakeHost>,
    log: Arc<Mutex<Vec<String>>>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: &str, behavior: FakeHost) -> Self {
        self.hosts.insert(host.to_string(), behavior);
        self
    }

    pub fn log(&self) -> Vec<String> {
        lock(&self.log).clone()
    }

    /// Log entries for one host and action.
    pub fn entries(&self, action: &str, host: &str) -> Vec<String> {
        let prefix = format!("{} {}", action, host);
        self.log()
            .into_iter()
            .filter(|e| e.starts_with(&prefix))
            .collect()
    }
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn open(&self, target: &RemoteTarget) -> Result<Box<dyn RemoteSession>, RemoteError> {
        let behavior = self.hosts.get(&target.host).cloned().ok_or_else(|| {
            RemoteError::Connect {
                host: target.host.clone(),
                message: "no route to host".to_string(),
            }
        })?;
        if behavior.refuse_connection {
            return Err(RemoteError::Connect {
                host: target.host.clone(),
                message: "connection refused".to_string(),
            });
        }
        lock(&self.log).push(format!("open {}: {}", target.host, target.user));
        Ok(Box::new(FakeSession {
            host: target.host.clone(),
            behavior,
            log: self.log.clone(),
        }))
    }
}

struct FakeSession {
    host: String,
    behavior: FakeHost,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl RemoteSession for FakeSession {
    async fn exec(&mut self, command: &str) -> Result<CommandOutput, RemoteError> {
        lock(&self.log).push(format!("exec {}: {}", self.host, command));
        if command.starts_with("if [ -x") {
            let status = if self.behavior.installed {
                "installed"
            } else {
                "not installed"
            };
            return Ok(CommandOutput {
                exit_status: 0,
                stdout: format!("{}\n", status),
                stderr: String::new(),
            });
        }
        if self.behavior.install_exit_status == 0 {
            self.behavior.installed = true;
            Ok(CommandOutput {
                exit_status: 0,
                stdout: "amazon-cloudwatch-agent installed".to_string(),
                stderr: String::new(),
            })
        } else {
            Ok(CommandOutput {
                exit_status: self.behavior.install_exit_status,
                stdout: String::new(),
                stderr: "E: Unable to locate package".to_string(),
            })
        }
    }

    async fn upload(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        lock(&self.log).push(format!(
            "upload {}: {} -> {}",
            self.host,
            local.display(),
            remote
        ));
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), RemoteError> {
        lock(&self.log).push(format!("close {}", self.host));
        Ok(())
    }
}
