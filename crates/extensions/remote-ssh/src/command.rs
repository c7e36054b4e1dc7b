//! Child process execution with captured output.

use std::process::Stdio;
use std::time::Duration;

use cloudsentry_protocols::{CommandOutput, RemoteError};
use tokio::process::Command;
use tokio::time::timeout;

/// Run `program` with `args`, capturing both streams.
///
/// The child is killed if `limit` elapses first. A child terminated by a
/// signal reports exit status -1.
pub async fn run_captured(
    program: &str,
    args: &[String],
    limit: Duration,
) -> Result<CommandOutput, RemoteError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = timeout(limit, cmd.output())
        .await
        .map_err(|_| RemoteError::Timeout(limit.as_secs()))?
        .map_err(|e| RemoteError::Exec(format!("failed to run {}: {}", program, e)))?;

    Ok(CommandOutput {
        exit_status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_captures_streams_and_status() {
        let output = run_captured("sh", &sh("echo out; echo err >&2; exit 3"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.exit_status, 3);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_timeout() {
        let err = run_captured("sh", &sh("sleep 5"), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = run_captured("cloudsentry-no-such-binary", &[], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Exec(_)));
    }
}
