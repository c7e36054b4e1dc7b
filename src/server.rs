//! Tracing setup, backend wiring and server startup for CloudSentry.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cloudsentry_api::{ApiConfig, ApiServer, AppState};
use cloudsentry_cloud_aws::AwsCloud;
use cloudsentry_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use cloudsentry_core::{Orchestrator, RegionFanout, ServiceCatalog};
use cloudsentry_protocols::IdentityApi;
use cloudsentry_remote_ssh::{OpenSshShell, SshOptions};

/// Initialize tracing with console and file output.
///
/// Log files roll daily under the configured log directory. `RUST_LOG`
/// takes precedence over the configured level.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = ConfigLoader::expand_path(&logging.dir.to_string_lossy());
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("cloudsentry")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop, so it must live for the whole process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Real collaborators wired from configuration.
pub(crate) struct Backends {
    pub cloud: Arc<AwsCloud>,
    pub orchestrator: Arc<Orchestrator>,
    pub discovery: Arc<RegionFanout>,
}

pub(crate) fn ssh_options(config: &Config) -> SshOptions {
    SshOptions {
        connect_timeout_secs: config.agent.connect_timeout_secs,
        command_timeout: Duration::from_secs(config.agent.command_timeout_secs),
        ..SshOptions::default()
    }
}

/// Reject invalid configuration and log warnings.
pub(crate) fn check_config(config: &Config) -> anyhow::Result<()> {
    let report = ConfigValidator::validate(config)?;
    for warning in &report.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if !report.is_valid() {
        let problems: Vec<String> = report
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        bail!("Invalid configuration: {}", problems.join("; "));
    }
    Ok(())
}

pub(crate) async fn build_backends(config: &Config) -> anyhow::Result<Backends> {
    check_config(config)?;

    let catalog = Arc::new(ServiceCatalog::builtin());
    let cloud = Arc::new(AwsCloud::load(config.cloud.anchor_region.clone()).await);
    let shell = Arc::new(OpenSshShell::new(ssh_options(config)));

    let orchestrator = Arc::new(Orchestrator::new(
        catalog.clone(),
        cloud.clone(),
        cloud.clone(),
        shell,
        config,
    ));
    let discovery = Arc::new(
        RegionFanout::new(cloud.clone(), catalog, config.cloud.anchor_region.clone())
            .with_call_timeout(Duration::from_secs(config.cloud.call_timeout_secs))
            .with_max_parallel(config.cloud.max_parallel_regions),
    );

    Ok(Backends {
        cloud,
        orchestrator,
        discovery,
    })
}

/// Run the API server in the foreground.
pub(crate) async fn run_server(
    config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    info!("Starting CloudSentry v{}", env!("CARGO_PKG_VERSION"));

    let backends = build_backends(&config).await?;
    let account = backends
        .cloud
        .caller_identity()
        .await
        .context("Cloud credentials could not be verified")?;
    info!(account = %account, region = %backends.cloud.anchor_region(), "Cloud credentials verified");

    let upload_dir = ConfigLoader::expand_path(&config.uploads.dir.to_string_lossy());
    std::fs::create_dir_all(&upload_dir)
        .with_context(|| format!("Failed to create upload directory {}", upload_dir))?;

    let api_config = ApiConfig::new(
        host.unwrap_or(config.server.host),
        port.unwrap_or(config.server.port),
    );
    let state = Arc::new(AppState::new(
        backends.orchestrator,
        backends.discovery,
        upload_dir,
    ));

    ApiServer::new(api_config, state)
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("API server failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_options_from_config() {
        let mut config = Config::default();
        config.agent.connect_timeout_secs = 7;
        config.agent.command_timeout_secs = 120;

        let options = ssh_options(&config);
        assert_eq!(options.connect_timeout_secs, 7);
        assert_eq!(options.command_timeout, Duration::from_secs(120));
        assert_eq!(options.ssh_program, "ssh");
    }

    #[test]
    fn test_check_config_rejects_errors() {
        let mut config = Config::default();
        config.server.port = 0;
        config.access.role_name = String::new();

        let err = check_config(&config).unwrap_err().to_string();
        assert!(err.contains("server.port"));
        assert!(err.contains("access.role_name"));
    }

    #[test]
    fn test_check_config_accepts_defaults() {
        assert!(check_config(&Config::default()).is_ok());
    }
}
