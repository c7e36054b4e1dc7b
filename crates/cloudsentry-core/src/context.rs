//! Deadline and cancellation context threaded through every network call.

use std::future::Future;
use std::time::Duration;

use cloudsentry_protocols::{CloudError, RemoteError};
use tokio_util::sync::CancellationToken;

/// Per-call deadline plus a shared cancellation token.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Deadline applied to each individual cloud call.
    pub timeout: Duration,

    cancel: CancellationToken,
}

impl CallContext {
    /// Create a context with a fresh cancellation token.
    pub fn new(timeout: Duration) -> Self {
        Self::with_token(timeout, CancellationToken::new())
    }

    /// Create a context bound to an existing cancellation token.
    pub fn with_token(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    /// Child context cancelled together with this one.
    pub fn child(&self) -> Self {
        Self {
            timeout: self.timeout,
            cancel: self.cancel.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run a cloud call under the context deadline.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> Result<T, CloudError>
    where
        F: Future<Output = Result<T, CloudError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CloudError::Cancelled(operation.to_string())),
            result = tokio::time::timeout(self.timeout, fut) => match result {
                Ok(inner) => inner,
                Err(_) => Err(CloudError::Timeout {
                    operation: operation.to_string(),
                    seconds: self.timeout.as_secs(),
                }),
            },
        }
    }

    /// Run a remote-shell step under an explicit deadline.
    pub async fn run_remote<T, F>(&self, timeout: Duration, fut: F) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(RemoteError::Cancelled),
            result = tokio::time::timeout(timeout, fut) => match result {
                Ok(inner) => inner,
                Err(_) => Err(RemoteError::Timeout(timeout.as_secs())),
            },
        }
    }

    /// Sleep unless cancelled first.
    pub async fn sleep(&self, duration: Duration) -> Result<(), CloudError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CloudError::Cancelled("settle delay".to_string())),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
