//! Tests for configuration loading, overrides, and validation.

use infra_gate::config::settings::{apply_env_overrides, load_settings_from};
use infra_gate::models::error::GateError;
use std::path::Path;

const BASE_CONFIG: &str = r#"
gate:
  host: 0.0.0.0
  ports:
    http: 8080
    https: 8443
  acme:
    email: ops@example.com
    cache_dir: ./data/acme
  bootstrap_routes:
    - id: api
      host: api.localhost
      path_prefix: /v1
      upstream: http://127.0.0.1:8081
services:
  console:
    host: 127.0.0.1
    port: 9000
"#;

fn write_config(dir: &Path, environment: &str, contents: &str) {
    std::fs::write(dir.join(format!("{environment}.yaml")), contents).unwrap();
}

fn overrides(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn loads_a_complete_config_file() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "test", BASE_CONFIG);

    let settings = load_settings_from(dir.path(), "test").unwrap();
    settings.validate().unwrap();

    assert_eq!(settings.gate.host, "0.0.0.0");
    assert_eq!(settings.gate.ports.http, 8080);
    assert_eq!(settings.gate.ports.https, 8443);
    assert_eq!(settings.gate.acme.email, "ops@example.com");
    assert!(settings.acme_enabled());
    assert_eq!(settings.management_port(), 9080);

    assert_eq!(settings.gate.bootstrap_routes.len(), 1);
    assert_eq!(settings.gate.bootstrap_routes[0].id, "api");

    let console = settings.services.console.as_ref().unwrap();
    assert_eq!(console.host, "127.0.0.1");
    assert_eq!(console.port, 9000);
}

#[test]
fn missing_file_is_config_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_settings_from(dir.path(), "absent").unwrap_err();
    assert!(matches!(err, GateError::ConfigMissing(_)));
}

#[test]
fn malformed_yaml_is_config_invalid() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "broken", "gate: [not, a, mapping");

    let err = load_settings_from(dir.path(), "broken").unwrap_err();
    assert!(matches!(err, GateError::ConfigInvalid(_)));
}

#[test]
fn minimal_config_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_config(
        dir.path(),
        "minimal",
        "gate:\n  host: 127.0.0.1\n  ports:\n    http: 8080\n    https: 8443\n",
    );

    let settings = load_settings_from(dir.path(), "minimal").unwrap();
    settings.validate().unwrap();

    assert_eq!(settings.gate.acme.email, "");
    assert!(!settings.acme_enabled());
    assert_eq!(settings.gate.acme.cache_dir, "./data/acme");
    assert!(settings.gate.bootstrap_routes.is_empty());
    assert!(settings.services.console.is_none());
}

#[test]
fn env_overrides_replace_file_values() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "test", BASE_CONFIG);
    let mut settings = load_settings_from(dir.path(), "test").unwrap();

    apply_env_overrides(
        &mut settings,
        overrides(&[
            ("INFRA_CORE_GATE_HOST", "10.1.2.3"),
            ("INFRA_CORE_GATE_HTTP_PORT", "9080"),
            ("INFRA_CORE_GATE_HTTPS_PORT", "9443"),
            ("INFRA_CORE_GATE_ACME_EMAIL", ""),
            ("INFRA_CORE_GATE_ACME_CACHE_DIR", "/var/lib/acme"),
            ("UNRELATED_VARIABLE", "ignored"),
        ]),
    )
    .unwrap();
    settings.validate().unwrap();

    assert_eq!(settings.gate.host, "10.1.2.3");
    assert_eq!(settings.gate.ports.http, 9080);
    assert_eq!(settings.gate.ports.https, 9443);
    assert!(!settings.acme_enabled());
    assert_eq!(settings.gate.acme.cache_dir, "/var/lib/acme");
    assert_eq!(settings.management_port(), 10080);
}

#[test]
fn unparsable_port_override_is_config_invalid() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "test", BASE_CONFIG);
    let mut settings = load_settings_from(dir.path(), "test").unwrap();

    for bad in ["not-a-port", "70000", "-1", ""] {
        let err = apply_env_overrides(
            &mut settings,
            overrides(&[("INFRA_CORE_GATE_HTTP_PORT", bad)]),
        )
        .unwrap_err();
        assert!(matches!(err, GateError::ConfigInvalid(_)), "{bad}");
    }
}

#[test]
fn validation_rejects_zero_ports_and_empty_host() {
    let dir = tempfile::tempdir().unwrap();
    write_config(
        dir.path(),
        "zero-port",
        "gate:\n  host: 127.0.0.1\n  ports:\n    http: 0\n    https: 8443\n",
    );
    let settings = load_settings_from(dir.path(), "zero-port").unwrap();
    assert!(matches!(
        settings.validate(),
        Err(GateError::ConfigInvalid(_))
    ));

    write_config(
        dir.path(),
        "empty-host",
        "gate:\n  host: \"\"\n  ports:\n    http: 8080\n    https: 8443\n",
    );
    let settings = load_settings_from(dir.path(), "empty-host").unwrap();
    assert!(matches!(
        settings.validate(),
        Err(GateError::ConfigInvalid(_))
    ));
}

#[test]
fn validation_rejects_management_port_overflow() {
    let dir = tempfile::tempdir().unwrap();
    write_config(
        dir.path(),
        "overflow",
        "gate:\n  host: 127.0.0.1\n  ports:\n    http: 65000\n    https: 8443\n",
    );
    let settings = load_settings_from(dir.path(), "overflow").unwrap();
    assert!(matches!(
        settings.validate(),
        Err(GateError::ConfigInvalid(_))
    ));
}
