//! Remote session errors.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("Connection to {host} failed: {message}")]
    Connect { host: String, message: String },

    #[error("Command execution failed: {0}")]
    Exec(String),

    #[error("File transfer failed: {0}")]
    Transfer(String),

    #[error("Remote operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Remote operation was cancelled")]
    Cancelled,

    #[error("Credential error: {0}")]
    Credential(String),
}
