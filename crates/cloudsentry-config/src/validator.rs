//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, REQUIRED_POLICIES};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, collecting every problem in one pass.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_cloud(config, &mut result);
        Self::validate_access(config, &mut result);
        Self::validate_agent(config, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_cloud(config: &Config, result: &mut ValidationResult) {
        if config.cloud.anchor_region.trim().is_empty() {
            result.add_error(ValidationError::new(
                "cloud.anchor_region",
                "Anchor region cannot be empty",
            ));
        }

        if config.cloud.call_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "cloud.call_timeout_secs",
                "call_timeout_secs must be greater than 0",
            ));
        }
    }

    fn validate_access(config: &Config, result: &mut ValidationResult) {
        if config.access.role_name.trim().is_empty() {
            result.add_error(ValidationError::new(
                "access.role_name",
                "Role name cannot be empty",
            ));
        }

        for policy in &config.access.required_policies {
            if !policy.starts_with("arn:") {
                result.add_error(ValidationError::new(
                    "access.required_policies",
                    format!("Policy '{}' is not an ARN", policy),
                ));
            }
        }

        let missing: Vec<&str> = REQUIRED_POLICIES
            .iter()
            .copied()
            .filter(|p| !config.access.required_policies.iter().any(|c| c == p))
            .collect();
        if !missing.is_empty() {
            result.add_warning(ValidationWarning::new(
                "access.required_policies",
                format!(
                    "Standard monitoring policies not required, agents may lack permissions: {:?}",
                    missing
                ),
            ));
        }
    }

    fn validate_agent(config: &Config, result: &mut ValidationResult) {
        if config.agent.connect_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "agent.connect_timeout_secs",
                "connect_timeout_secs must be greater than 0",
            ));
        }

        if config.agent.command_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "agent.command_timeout_secs",
                "command_timeout_secs must be greater than 0",
            ));
        }

        if !config.agent.remote_script_path.starts_with('/') {
            result.add_error(ValidationError::new(
                "agent.remote_script_path",
                "remote_script_path must be absolute",
            ));
        }

        if !config.agent.install_script.exists() {
            result.add_warning(ValidationWarning::new(
                "agent.install_script",
                format!(
                    "Install script does not exist: {:?}",
                    config.agent.install_script
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
