use availability::RetryPolicy;
use availability_config::{
    ConfigError, parse_file, parse_str, parser::missing_env_vars, resolve_target, resolve_targets,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

const NETWORK_YAML: &str = r#"
version: "1.0"
name: test-network
description: CAs and ordering service for the integration network
settings:
  request_timeout: 2
  deadline: 30
targets:
  org1-ca:
    url: "https://${ORG1_CA_HOST:-localhost}:7054"
    accept_invalid_certs: true
  org2-ca:
    url: "https://localhost:8054"
    ca_certificate: "/etc/hyperledger/org2/ca-cert.pem"
    deadline: 90
    expected_status: 200
    retry:
      transport_errors: true
      interval_ms: 250
  orderer:
    url: "http://localhost:9443"
    health_path: /healthz
    request_timeout: 1
    deadline: 10
"#;

#[test]
fn test_parse_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(NETWORK_YAML.as_bytes()).unwrap();

    let config = parse_file(file.path()).unwrap();
    assert_eq!(config.name.as_deref(), Some("test-network"));
    assert_eq!(config.targets.len(), 3);
}

#[test]
fn test_missing_file() {
    let result = parse_file("/nonexistent/targets.yaml");
    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}

#[test]
fn test_settings_apply_as_defaults() {
    let config = parse_str(NETWORK_YAML).unwrap();

    let org1 = resolve_target(&config, "org1-ca").unwrap();
    assert_eq!(org1.poll.request_timeout, Duration::from_secs(2));
    assert_eq!(org1.poll.deadline, Duration::from_secs(30));
    assert!(org1.probe.accept_invalid_certs);
    assert_eq!(org1.probe.health_path, "/cainfo");

    let orderer = resolve_target(&config, "orderer").unwrap();
    assert_eq!(orderer.poll.request_timeout, Duration::from_secs(1));
    assert_eq!(orderer.poll.deadline, Duration::from_secs(10));
    assert_eq!(orderer.health_url(), "http://localhost:9443/healthz");
}

#[test]
fn test_retry_and_tls_options() {
    let config = parse_str(NETWORK_YAML).unwrap();
    let org2 = resolve_target(&config, "org2-ca").unwrap();

    assert_eq!(org2.poll.deadline, Duration::from_secs(90));
    assert_eq!(org2.poll.expected_status, Some(200));
    assert_eq!(
        org2.poll.retry,
        RetryPolicy {
            transport_errors: true,
            unexpected_status: false,
            interval: Duration::from_millis(250),
        }
    );
    assert!(!org2.probe.accept_invalid_certs);
    assert_eq!(
        org2.probe.ca_certificate,
        Some(PathBuf::from("/etc/hyperledger/org2/ca-cert.pem"))
    );
}

#[test]
fn test_resolve_all_targets_in_name_order() {
    let config = parse_str(NETWORK_YAML).unwrap();
    let names: Vec<String> = resolve_targets(&config, &[])
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["orderer", "org1-ca", "org2-ca"]);

    let selected = resolve_targets(&config, &["org2-ca".to_string()]).unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].name, "org2-ca");
}

#[test]
fn test_unknown_target() {
    let config = parse_str(NETWORK_YAML).unwrap();
    let result = resolve_targets(&config, &["peer0".to_string()]);
    assert!(matches!(result, Err(ConfigError::TargetNotFound(name)) if name == "peer0"));
}

#[test]
fn test_rejects_unsupported_version() {
    let yaml = r#"
version: "2.0"
targets:
  ca:
    url: "http://localhost:7054"
"#;
    assert!(matches!(parse_str(yaml), Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_rejects_empty_targets() {
    let yaml = r#"
version: "1.0"
targets: {}
"#;
    assert!(matches!(parse_str(yaml), Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_rejects_timeout_not_below_deadline() {
    let yaml = r#"
version: "1.0"
targets:
  ca:
    url: "http://localhost:7054"
    request_timeout: 30
    deadline: 30
"#;
    match parse_str(yaml) {
        Err(ConfigError::InvalidTarget { name, source }) => {
            assert_eq!(name, "ca");
            assert!(matches!(source, availability::Error::Configuration(_)));
        }
        other => panic!("Expected InvalidTarget, got {:?}", other),
    }
}

#[test]
fn test_rejects_invalid_url() {
    let yaml = r#"
version: "1.0"
targets:
  ca:
    url: "localhost:7054"
"#;
    assert!(matches!(
        parse_str(yaml),
        Err(ConfigError::InvalidTarget { .. })
    ));
}

#[test]
fn test_unresolved_variable_checked_at_resolution() {
    let yaml = r#"
version: "1.0"
targets:
  ca:
    url: "https://${CA_AWAIT_TEST_UNSET_HOST}:7054"
"#;
    let config = parse_str(yaml).unwrap();

    let missing = missing_env_vars(&config).unwrap();
    assert_eq!(missing, vec!["CA_AWAIT_TEST_UNSET_HOST".to_string()]);

    assert!(matches!(
        resolve_target(&config, "ca"),
        Err(ConfigError::EnvVarNotFound(_))
    ));
}
