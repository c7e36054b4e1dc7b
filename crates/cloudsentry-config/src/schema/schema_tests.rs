use super::*;

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.cloud.anchor_region, "us-east-1");
    assert_eq!(config.cloud.call_timeout_secs, 30);
    assert_eq!(config.cloud.max_parallel_regions, 0);
    assert_eq!(config.uploads.dir, PathBuf::from("uploaded_keys"));
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_access_defaults() {
    let access = AccessConfig::default();
    assert_eq!(access.role_name, "MonitoringRole");
    assert_eq!(access.profile_name(), "MonitoringRoleProfile");
    assert_eq!(access.settle_delay_secs, 10);
    assert_eq!(access.required_policies.len(), 6);
    assert!(
        access
            .required_policies
            .contains(&"arn:aws:iam::aws:policy/CloudWatchAgentServerPolicy".to_string())
    );
}

#[test]
fn test_agent_defaults() {
    let agent = AgentConfig::default();
    assert_eq!(agent.remote_user, "ubuntu");
    assert_eq!(agent.remote_script_path, "/home/ubuntu/install_cloudwatchagent.sh");
    assert_eq!(agent.connect_timeout_secs, 15);
    assert_eq!(agent.command_timeout_secs, 600);
    assert_eq!(agent.max_parallel_targets, 1);
}

#[test]
fn test_agent_probe_command() {
    let agent = AgentConfig::default();
    assert_eq!(
        agent.probe_command(),
        "if [ -x /opt/aws/amazon-cloudwatch-agent/bin/amazon-cloudwatch-agent-ctl ]; \
         then echo 'installed'; else echo 'not installed'; fi"
    );
}

#[test]
fn test_agent_install_command() {
    let agent = AgentConfig {
        remote_script_path: "/tmp/install.sh".to_string(),
        ..AgentConfig::default()
    };
    assert_eq!(
        agent.install_command(),
        "chmod +x /tmp/install.sh && sudo bash /tmp/install.sh"
    );
}

#[test]
fn test_config_partial_sections() {
    let config: Config = toml::from_str(
        r#"
        [access]
        role_name = "OpsRole"
        "#,
    )
    .unwrap();
    assert_eq!(config.access.role_name, "OpsRole");
    assert_eq!(config.access.settle_delay_secs, 10);
    assert_eq!(config.agent.remote_user, "ubuntu");
}

#[test]
fn test_config_serialization_roundtrip() {
    let config = Config::default();
    let text = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed.cloud.anchor_region, config.cloud.anchor_region);
    assert_eq!(parsed.access.required_policies, config.access.required_policies);
}
