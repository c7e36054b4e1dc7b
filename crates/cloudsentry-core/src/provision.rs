//! Telemetry agent provisioning over remote shell sessions.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use cloudsentry_config::AgentConfig;
use cloudsentry_protocols::{
    ProvisionOutcome, RemoteError, RemoteSession, RemoteShell, RemoteTarget,
};
use tracing::{debug, error, info};

use crate::context::CallContext;

/// Installs the telemetry agent on hosts that do not have it yet.
pub struct AgentProvisioner {
    shell: Arc<dyn RemoteShell>,
    config: AgentConfig,
}

impl AgentProvisioner {
    pub fn new(shell: Arc<dyn RemoteShell>, config: AgentConfig) -> Self {
        Self { shell, config }
    }

    /// Provision one host. Failures of any step become a `failed` outcome.
    pub async fn provision(
        &self,
        resource_id: &str,
        address: &str,
        key_path: &Path,
        ctx: &CallContext,
    ) -> ProvisionOutcome {
        match self.try_provision(resource_id, address, key_path, ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(resource_id, address, "Agent provisioning failed: {}", e);
                ProvisionOutcome::failed(resource_id, e.to_string())
            }
        }
    }

    async fn try_provision(
        &self,
        resource_id: &str,
        address: &str,
        key_path: &Path,
        ctx: &CallContext,
    ) -> Result<ProvisionOutcome, RemoteError> {
        restrict_key_permissions(key_path).await?;

        let target = RemoteTarget::new(address, &self.config.remote_user, key_path);
        let connect_timeout = Duration::from_secs(self.config.connect_timeout_secs);
        let mut session = ctx
            .run_remote(connect_timeout, self.shell.open(&target))
            .await?;

        let result = self.install_if_missing(session.as_mut(), resource_id, ctx).await;
        if let Err(e) = session.close().await {
            debug!(resource_id, "Closing remote session failed: {}", e);
        }
        result
    }

    async fn install_if_missing(
        &self,
        session: &mut dyn RemoteSession,
        resource_id: &str,
        ctx: &CallContext,
    ) -> Result<ProvisionOutcome, RemoteError> {
        let command_timeout = Duration::from_secs(self.config.command_timeout_secs);
        let connect_timeout = Duration::from_secs(self.config.connect_timeout_secs);

        let probe = ctx
            .run_remote(connect_timeout, session.exec(&self.config.probe_command()))
            .await?;
        if probe.stdout.trim() == "installed" {
            info!(resource_id, "Telemetry agent already installed, skipping");
            return Ok(ProvisionOutcome::already_installed(resource_id));
        }

        if !self.config.install_script.exists() {
            return Err(RemoteError::Transfer(format!(
                "install script not found: {}",
                self.config.install_script.display()
            )));
        }
        ctx.run_remote(
            command_timeout,
            session.upload(&self.config.install_script, &self.config.remote_script_path),
        )
        .await?;

        let output = ctx
            .run_remote(command_timeout, session.exec(&self.config.install_command()))
            .await?;
        if output.success() {
            info!(resource_id, "Telemetry agent installed");
            Ok(ProvisionOutcome::installed(resource_id, output.combined()))
        } else {
            error!(
                resource_id,
                exit_status = output.exit_status,
                "Agent install script failed: {}",
                output.stderr
            );
            Ok(ProvisionOutcome::failed(
                resource_id,
                format!("exit status {}: {}", output.exit_status, output.combined()),
            ))
        }
    }
}

/// Restrict a private key to owner-read-only.
#[cfg(unix)]
async fn restrict_key_permissions(key_path: &Path) -> Result<(), RemoteError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(key_path, std::fs::Permissions::from_mode(0o400))
        .await
        .map_err(|e| RemoteError::Credential(format!("{}: {}", key_path.display(), e)))
}

#[cfg(not(unix))]
async fn restrict_key_permissions(key_path: &Path) -> Result<(), RemoteError> {
    if key_path.exists() {
        Ok(())
    } else {
        Err(RemoteError::Credential(format!(
            "{}: not found",
            key_path.display()
        )))
    }
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
