//! Configuration loader.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Substitute `${VAR}` references in a single left-to-right pass.
    ///
    /// Substituted values are not scanned again.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")?;
        let mut expanded = String::with_capacity(content.len());
        let mut last = 0;

        for cap in re.captures_iter(content) {
            let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            let value = std::env::var(name.as_str())
                .map_err(|_| ConfigError::EnvVarNotSet(name.as_str().to_string()))?;
            expanded.push_str(&content[last..whole.start()]);
            expanded.push_str(&value);
            last = whole.end();
        }
        expanded.push_str(&content[last..]);

        Ok(expanded)
    }

    /// Expand shell-style paths (e.g., `~/.cloudsentry`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.cloud.anchor_region, "us-east-1");
    }

    #[test]
    fn test_load_basic_config() {
        let content = r#"
            [server]
            host = "0.0.0.0"
            port = 3000

            [cloud]
            anchor_region = "eu-west-1"
            call_timeout_secs = 10
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.cloud.anchor_region, "eu-west-1");
        assert_eq!(config.cloud.call_timeout_secs, 10);
    }

    #[test]
    fn test_load_agent_and_access() {
        let content = r#"
            [agent]
            remote_user = "ec2-user"
            max_parallel_targets = 4

            [access]
            role_name = "CustomMonitoringRole"
            settle_delay_secs = 0
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.agent.remote_user, "ec2-user");
        assert_eq!(config.agent.max_parallel_targets, 4);
        assert_eq!(config.access.role_name, "CustomMonitoringRole");
        assert_eq!(config.access.settle_delay_secs, 0);
        assert_eq!(config.access.required_policies.len(), 6);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]").unwrap();
        writeln!(file, "port = 5050").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.server.port, 5050);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/cloudsentry.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/cloudsentry.toml")).unwrap();
        assert_eq!(config.access.role_name, "MonitoringRole");
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("CLOUDSENTRY_TEST_REGION", "ap-south-1");
        }
        let content = "anchor_region = \"${CLOUDSENTRY_TEST_REGION}\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert!(expanded.contains("ap-south-1"));
        unsafe {
            std::env::remove_var("CLOUDSENTRY_TEST_REGION");
        }
    }

    #[test]
    fn test_expanded_values_are_not_rescanned() {
        // SAFETY: unique test-only env var
        unsafe {
            std::env::set_var("CLOUDSENTRY_TEST_LITERAL", "${HOME}");
        }
        let expanded =
            ConfigLoader::expand_env_vars("dir = \"${CLOUDSENTRY_TEST_LITERAL}/logs\"").unwrap();
        assert_eq!(expanded, "dir = \"${HOME}/logs\"");
        unsafe {
            std::env::remove_var("CLOUDSENTRY_TEST_LITERAL");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_CLOUDSENTRY_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/keys");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/keys"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/etc/cloudsentry"), "/etc/cloudsentry");
    }
}
