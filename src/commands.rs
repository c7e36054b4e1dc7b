//! One-shot subcommand handlers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use cloudsentry_config::Config;
use cloudsentry_core::{ConfigureRequest, ProgressReporter, ServiceCatalog};

use crate::server::build_backends;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn services() -> anyhow::Result<()> {
    print_json(&ServiceCatalog::builtin().services())
}

pub(crate) fn metrics(service: &str) -> anyhow::Result<()> {
    let metrics = ServiceCatalog::builtin().metrics(service)?;
    print_json(&metrics)
}

pub(crate) async fn regions(config: &Config) -> anyhow::Result<()> {
    let backends = build_backends(config).await?;
    let ctx = backends.discovery.context();
    print_json(&backends.discovery.regions(&ctx).await?)
}

pub(crate) async fn discover(config: &Config, service: &str) -> anyhow::Result<()> {
    let backends = build_backends(config).await?;
    let ctx = backends.discovery.context();
    print_json(&backends.discovery.discover_all(service, &ctx).await?)
}

pub(crate) async fn configure(config: &Config, request: &Path, keys: &[String]) -> anyhow::Result<()> {
    let value = read_request(request)?;
    let uploaded = credential_map(keys)?;
    let backends = build_backends(config).await?;

    let (progress, mut events) = ProgressReporter::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            info!(run_id = %event.run_id, percent = event.percent, "{}", event.message);
        }
    });

    let result = backends
        .orchestrator
        .configure_value(&value, uploaded, &progress)
        .await;
    drop(progress);
    let _ = printer.await;

    print_json(&result?)
}

pub(crate) fn read_request(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Parse one `<resourceId>=<path>` argument.
pub(crate) fn parse_key_arg(arg: &str) -> anyhow::Result<(String, PathBuf)> {
    let Some((id, path)) = arg.split_once('=') else {
        bail!("Expected <resourceId>=<path>, got '{}'", arg);
    };
    let (id, path) = (id.trim(), path.trim());
    if id.is_empty() || path.is_empty() {
        bail!("Expected <resourceId>=<path>, got '{}'", arg);
    }
    let path = PathBuf::from(shellexpand::tilde(path).as_ref());
    if !path.is_file() {
        bail!("Credential file not found for {}: {}", id, path.display());
    }
    Ok((id.to_string(), path))
}

/// Credential map keyed the way uploads are keyed.
pub(crate) fn credential_map(keys: &[String]) -> anyhow::Result<HashMap<String, PathBuf>> {
    let mut map = HashMap::new();
    for arg in keys {
        let (id, path) = parse_key_arg(arg)?;
        if map.insert(ConfigureRequest::credential_key(&id), path).is_some() {
            bail!("Credential given twice for {}", id);
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key_file(dir: &TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, "-----BEGIN KEY-----").unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_parse_key_arg() {
        let dir = TempDir::new().unwrap();
        let path = key_file(&dir, "a.pem");

        let (id, parsed) = parse_key_arg(&format!("i-1={}", path)).unwrap();
        assert_eq!(id, "i-1");
        assert_eq!(parsed, PathBuf::from(path));
    }

    #[test]
    fn test_parse_key_arg_rejects_malformed() {
        assert!(parse_key_arg("i-1").is_err());
        assert!(parse_key_arg("=/keys/a.pem").is_err());
        assert!(parse_key_arg("i-1=").is_err());
    }

    #[test]
    fn test_parse_key_arg_missing_file() {
        let err = parse_key_arg("i-1=/nonexistent/a.pem").unwrap_err();
        assert!(err.to_string().contains("i-1"));
    }

    #[test]
    fn test_credential_map_uses_upload_keys() {
        let dir = TempDir::new().unwrap();
        let a = key_file(&dir, "a.pem");
        let b = key_file(&dir, "b.pem");

        let map = credential_map(&[format!("i-1={}", a), format!("i-2={}", b)]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["key_i-1"], PathBuf::from(a));
        assert_eq!(map["key_i-2"], PathBuf::from(b));
    }

    #[test]
    fn test_credential_map_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let a = key_file(&dir, "a.pem");

        let err = credential_map(&[format!("i-1={}", a), format!("i-1={}", a)]).unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_read_request() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(&path, r#"{"region": "us-east-1", "service": "EC2"}"#).unwrap();

        let value = read_request(&path).unwrap();
        assert_eq!(value["service"], "EC2");

        std::fs::write(&path, "{not json").unwrap();
        assert!(read_request(&path).is_err());
    }
}
