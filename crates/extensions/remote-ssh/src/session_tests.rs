use super::*;
use tempfile::TempDir;

fn target() -> RemoteTarget {
    RemoteTarget::new("10.0.0.5", "ubuntu", "/keys/key_i-1")
}

fn session(control_dir: &Path) -> OpenSshSession {
    OpenSshSession {
        target: target(),
        options: SshOptions {
            control_dir: control_dir.to_path_buf(),
            ..SshOptions::default()
        },
        control_path: control_dir.join("cs-test.sock"),
    }
}

#[test]
fn test_ssh_args() {
    let dir = TempDir::new().unwrap();
    let args = session(dir.path()).ssh_args("uptime");

    assert_eq!(&args[..2], ["-i", "/keys/key_i-1"]);
    assert!(args.contains(&"StrictHostKeyChecking=no".to_string()));
    assert!(args.contains(&"BatchMode=yes".to_string()));
    assert!(args.contains(&"ConnectTimeout=15".to_string()));
    assert_eq!(args[args.len() - 2], "ubuntu@10.0.0.5");
    assert_eq!(args[args.len() - 1], "uptime");
}

#[test]
fn test_scp_args() {
    let dir = TempDir::new().unwrap();
    let args = session(dir.path()).scp_args(Path::new("/tmp/install.sh"), "/home/ubuntu/install.sh");

    assert_eq!(args[args.len() - 2], "/tmp/install.sh");
    assert_eq!(args[args.len() - 1], "ubuntu@10.0.0.5:/home/ubuntu/install.sh");
    let control = format!("ControlPath={}", dir.path().join("cs-test.sock").display());
    assert!(args.contains(&control));
}

#[test]
fn test_connect_error_message() {
    let dir = TempDir::new().unwrap();
    let s = session(dir.path());
    let output = CommandOutput {
        exit_status: 255,
        stdout: String::new(),
        stderr: "ssh: connect to host 10.0.0.5 port 22: Connection refused\n".to_string(),
    };
    let err = s.connect_error(&output);
    assert!(err.to_string().contains("Connection refused"));

    let silent = CommandOutput {
        exit_status: 255,
        ..CommandOutput::default()
    };
    assert!(s.connect_error(&silent).to_string().contains("status 255"));
}

#[cfg(unix)]
mod fake_binaries {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn shell(dir: &Path, ssh_body: &str, scp_body: &str) -> OpenSshShell {
        OpenSshShell::new(SshOptions {
            ssh_program: script(dir, "ssh", ssh_body),
            scp_program: script(dir, "scp", scp_body),
            control_dir: dir.to_path_buf(),
            ..SshOptions::default()
        })
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let dir = TempDir::new().unwrap();
        let shell = shell(dir.path(), "printf '%s\\n' \"$@\"", "exit 0");

        let mut session = shell.open(&target()).await.unwrap();
        let output = session.exec("uptime").await.unwrap();
        assert!(output.success());
        let lines: Vec<&str> = output.stdout.lines().collect();
        assert_eq!(lines.last(), Some(&"uptime"));
        assert!(lines.contains(&"ubuntu@10.0.0.5"));

        session
            .upload(Path::new("/tmp/install.sh"), "/home/ubuntu/install.sh")
            .await
            .unwrap();
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_remote_exit_status_is_reported() {
        let dir = TempDir::new().unwrap();
        let shell = shell(
            dir.path(),
            "for last; do :; done\nif [ \"$last\" = true ]; then exit 0; fi\necho 'E: broken' >&2\nexit 2",
            "exit 0",
        );

        let mut session = shell.open(&target()).await.unwrap();
        let output = session.exec("sudo bash install.sh").await.unwrap();
        assert_eq!(output.exit_status, 2);
        assert_eq!(output.stderr.trim(), "E: broken");
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let dir = TempDir::new().unwrap();
        let shell = shell(dir.path(), "echo 'Connection refused' >&2\nexit 255", "exit 1");

        let err = match shell.open(&target()).await {
            Ok(_) => panic!("open should fail for an unreachable host"),
            Err(e) => e,
        };
        assert!(matches!(err, RemoteError::Connect { .. }));
        assert!(err.to_string().contains("Connection refused"));
    }

    #[tokio::test]
    async fn test_failed_transfer() {
        let dir = TempDir::new().unwrap();
        let shell = shell(dir.path(), "exit 0", "echo 'Permission denied' >&2\nexit 1");

        let mut session = shell.open(&target()).await.unwrap();
        let err = session
            .upload(Path::new("/tmp/install.sh"), "/root/install.sh")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Transfer(_)));
        assert!(err.to_string().contains("Permission denied"));
    }
}
