//! OpenSSH-backed [`RemoteShell`] implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use cloudsentry_protocols::{CommandOutput, RemoteError, RemoteSession, RemoteShell, RemoteTarget};
use tracing::debug;
use uuid::Uuid;

use crate::command::run_captured;

/// Exit status ssh itself uses for connection and protocol failures.
const SSH_FAILURE_STATUS: i32 = 255;

#[derive(Debug, Clone)]
pub struct SshOptions {
    pub ssh_program: String,
    pub scp_program: String,
    pub connect_timeout_secs: u64,
    /// Upper bound on any single remote command or transfer.
    pub command_timeout: Duration,
    /// Directory for control master sockets.
    pub control_dir: PathBuf,
    pub control_persist_secs: u64,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".to_string(),
            scp_program: "scp".to_string(),
            connect_timeout_secs: 15,
            command_timeout: Duration::from_secs(600),
            control_dir: std::env::temp_dir(),
            control_persist_secs: 60,
        }
    }
}

/// Opens sessions by spawning the `ssh` and `scp` binaries.
#[derive(Debug, Clone, Default)]
pub struct OpenSshShell {
    options: SshOptions,
}

impl OpenSshShell {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl RemoteShell for OpenSshShell {
    async fn open(&self, target: &RemoteTarget) -> Result<Box<dyn RemoteSession>, RemoteError> {
        let control_path = self
            .options
            .control_dir
            .join(format!("cs-{}.sock", Uuid::new_v4().simple()));
        let session = OpenSshSession {
            target: target.clone(),
            options: self.options.clone(),
            control_path,
        };

        let limit = Duration::from_secs(self.options.connect_timeout_secs + 5);
        let output = run_captured(&self.options.ssh_program, &session.ssh_args("true"), limit).await?;
        if output.exit_status != 0 {
            return Err(session.connect_error(&output));
        }
        debug!(host = %target.host, user = %target.user, "SSH session established");
        Ok(Box::new(session))
    }
}

/// One multiplexed connection to a host.
#[derive(Debug)]
pub struct OpenSshSession {
    target: RemoteTarget,
    options: SshOptions,
    control_path: PathBuf,
}

impl OpenSshSession {
    fn destination(&self) -> String {
        format!("{}@{}", self.target.user, self.target.host)
    }

    fn common_args(&self) -> Vec<String> {
        let mut args = vec!["-i".to_string(), self.target.key_path.display().to_string()];
        for option in [
            "StrictHostKeyChecking=no".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
            "BatchMode=yes".to_string(),
            "LogLevel=ERROR".to_string(),
            format!("ConnectTimeout={}", self.options.connect_timeout_secs),
            "ControlMaster=auto".to_string(),
            format!("ControlPath={}", self.control_path.display()),
            format!("ControlPersist={}", self.options.control_persist_secs),
        ] {
            args.push("-o".to_string());
            args.push(option);
        }
        args
    }

    fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = self.common_args();
        args.push(self.destination());
        args.push(command.to_string());
        args
    }

    fn scp_args(&self, local: &Path, remote: &str) -> Vec<String> {
        let mut args = self.common_args();
        args.push(local.display().to_string());
        args.push(format!("{}:{}", self.destination(), remote));
        args
    }

    fn connect_error(&self, output: &CommandOutput) -> RemoteError {
        let message = match output.stderr.trim() {
            "" => format!("ssh exited with status {}", output.exit_status),
            stderr => stderr.to_string(),
        };
        RemoteError::Connect {
            host: self.target.host.clone(),
            message,
        }
    }
}

#[async_trait]
impl RemoteSession for OpenSshSession {
    async fn exec(&mut self, command: &str) -> Result<CommandOutput, RemoteError> {
        debug!(host = %self.target.host, command, "Running remote command");
        let output = run_captured(
            &self.options.ssh_program,
            &self.ssh_args(command),
            self.options.command_timeout,
        )
        .await?;
        if output.exit_status == SSH_FAILURE_STATUS {
            return Err(self.connect_error(&output));
        }
        Ok(output)
    }

    async fn upload(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        let output = run_captured(
            &self.options.scp_program,
            &self.scp_args(local, remote),
            self.options.command_timeout,
        )
        .await?;
        if !output.success() {
            return Err(RemoteError::Transfer(format!(
                "{} -> {}: {}",
                local.display(),
                remote,
                output.stderr.trim()
            )));
        }
        debug!(host = %self.target.host, remote, "Uploaded file");
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), RemoteError> {
        let args = vec![
            "-o".to_string(),
            format!("ControlPath={}", self.control_path.display()),
            "-O".to_string(),
            "exit".to_string(),
            self.destination(),
        ];
        let limit = Duration::from_secs(self.options.connect_timeout_secs);
        let output = run_captured(&self.options.ssh_program, &args, limit).await?;
        if !output.success() {
            debug!(host = %self.target.host, "Control master already gone: {}", output.stderr.trim());
        }
        if let Err(e) = tokio::fs::remove_file(&self.control_path).await {
            debug!(path = %self.control_path.display(), "No control socket to remove: {}", e);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
