//! Cloud API errors.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CloudError {
    #[error("{operation} failed: {message}")]
    Api { operation: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{operation} timed out after {seconds} seconds")]
    Timeout { operation: String, seconds: u64 },

    #[error("{0} was cancelled")]
    Cancelled(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Credentials error: {0}")]
    Credentials(String),
}

impl CloudError {
    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = CloudError::api("DescribeInstances", "AccessDenied");
        let display = err.to_string();
        assert!(display.contains("DescribeInstances"));
        assert!(display.contains("AccessDenied"));
    }

    #[test]
    fn test_timeout_error_display() {
        let err = CloudError::Timeout {
            operation: "ListFunctions".to_string(),
            seconds: 30,
        };
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_not_found_display() {
        let err = CloudError::NotFound("instance i-123".to_string());
        assert!(err.to_string().contains("i-123"));
    }

    #[test]
    fn test_cancelled_display() {
        let err = CloudError::Cancelled("PutDashboard".to_string());
        assert!(err.to_string().contains("cancelled"));
    }
}
