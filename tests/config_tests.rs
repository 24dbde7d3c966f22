//! Configuration loading tests

use globus_share::config::{DirMode, LogFormat, load_config_from_str};

const MINIMAL_CONFIG: &str = r#"
[endpoint]
id = "3aca022a-5e5b-11e6-8309-22000b97daec"
"#;

const FULL_CONFIG: &str = r#"
[transfer]
url = "https://transfer.example.org/v0.10/"
timeout_secs = 10
max_retries = 4
verify_ssl = false

[auth]
url = "https://auth.example.org"
client_id = "26d64c4c-fcc2-4f7c-b056-62f185875af6"
redirect_uri = "https://auth.example.org/v2/web/auth-code"
scopes = ["openid", "urn:globus:auth:scope:transfer.api.globus.org:all"]
identity_domain = "example.org"
timeout_secs = 15

[endpoint]
id = "3aca022a-5e5b-11e6-8309-22000b97daec"

[credentials]
path = "/etc/globus-share/credentials.toml"

[share]
audit_log = "/srv/log/shares.log"
directory_mode = "2770"
startup_grace_secs = 5

[logging]
level = "debug"
format = "json"
"#;

#[test]
fn test_minimal_config() {
    let config = load_config_from_str(MINIMAL_CONFIG).unwrap();

    assert_eq!(config.endpoint.id, "3aca022a-5e5b-11e6-8309-22000b97daec");
    assert_eq!(config.transfer.url, "https://transfer.api.globus.org/v0.10");
    assert_eq!(config.auth.url, "https://auth.globus.org");
    assert!(config.auth.client_id.is_none());
    assert_eq!(config.share.directory_mode, DirMode::DEFAULT);
    assert_eq!(config.share.audit_log, "/var/log/globus_shares.log");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    assert_eq!(config.transfer.api_url(), "https://transfer.example.org/v0.10");
    assert_eq!(config.transfer.timeout_secs, 10);
    assert_eq!(config.transfer.max_retries, 4);
    assert!(!config.transfer.verify_ssl);

    assert_eq!(
        config.auth.client_id.as_deref(),
        Some("26d64c4c-fcc2-4f7c-b056-62f185875af6")
    );
    assert_eq!(config.auth.scopes.len(), 2);
    assert_eq!(config.auth.identity_domain, "example.org");
    assert_eq!(config.auth.timeout_secs, 15);

    assert_eq!(
        config.credentials.resolved_path().to_str(),
        Some("/etc/globus-share/credentials.toml")
    );
    assert_eq!(
        config.share.audit_log_path().to_str(),
        Some("/srv/log/shares.log")
    );
    assert_eq!(config.share.directory_mode.bits(), 0o2770);
    assert_eq!(config.share.startup_grace_secs, 5);

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_invalid_log_format() {
    let config_str = r#"
[logging]
format = "xml"
"#;

    assert!(load_config_from_str(config_str).is_err());
}

#[test]
fn test_world_writable_mode_is_accepted() {
    let config_str = r#"
[share]
directory_mode = "0777"
"#;

    let config = load_config_from_str(config_str).unwrap();
    assert!(config.share.directory_mode.is_world_writable());
}

#[test]
#[serial_test::serial]
fn test_endpoint_id_from_environment() {
    use globus_share::config::load_config;
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("globus-share.toml");
    fs::write(&config_path, "[share]\naudit_log = \"/tmp/shares.log\"\n").unwrap();

    unsafe {
        env::set_var("GLOBUS_ENDPOINT_ID", "ddb59aef-6d04-11e5-ba46-22000b92c6ec");
    }

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.endpoint.id, "ddb59aef-6d04-11e5-ba46-22000b92c6ec");

    unsafe {
        env::remove_var("GLOBUS_ENDPOINT_ID");
    }
}

#[test]
#[serial_test::serial]
fn test_endpoint_id_env_overrides_file() {
    use globus_share::config::load_config;
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("globus-share.toml");
    fs::write(&config_path, MINIMAL_CONFIG).unwrap();

    unsafe {
        env::set_var("GLOBUS_ENDPOINT_ID", "ddb59aef-6d04-11e5-ba46-22000b92c6ec");
    }

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.endpoint.id, "ddb59aef-6d04-11e5-ba46-22000b92c6ec");

    unsafe {
        env::remove_var("GLOBUS_ENDPOINT_ID");
    }
}

#[test]
#[serial_test::serial]
fn test_missing_endpoint_id_is_rejected() {
    use globus_share::config::load_config;
    use globus_share::error::ConfigError;
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("globus-share.toml");
    fs::write(&config_path, "[logging]\nlevel = \"warn\"\n").unwrap();

    unsafe {
        env::remove_var("GLOBUS_ENDPOINT_ID");
        env::remove_var("GLOBUS_SHARE__ENDPOINT__ID");
    }

    let result = load_config(Some(config_path.to_str().unwrap()));
    assert!(matches!(result, Err(ConfigError::Missing { field }) if field.starts_with("endpoint.id")));
}

#[test]
#[serial_test::serial]
fn test_nested_env_overrides() {
    use globus_share::config::load_config;
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("globus-share.toml");
    fs::write(&config_path, MINIMAL_CONFIG).unwrap();

    unsafe {
        env::remove_var("GLOBUS_ENDPOINT_ID");
        env::set_var("GLOBUS_SHARE__SHARE__AUDIT_LOG", "/tmp/env-shares.log");
        env::set_var("GLOBUS_SHARE__TRANSFER__TIMEOUT_SECS", "45");
    }

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.share.audit_log, "/tmp/env-shares.log");
    assert_eq!(config.transfer.timeout_secs, 45);

    unsafe {
        env::remove_var("GLOBUS_SHARE__SHARE__AUDIT_LOG");
        env::remove_var("GLOBUS_SHARE__TRANSFER__TIMEOUT_SECS");
    }
}

#[test]
#[serial_test::serial]
fn test_bootstrap_config_requires_client_id_only() {
    use globus_share::config::load_bootstrap_config;
    use globus_share::error::ConfigError;
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    unsafe {
        env::remove_var("GLOBUS_ENDPOINT_ID");
    }

    let dir = tempdir().unwrap();
    let without_client = dir.path().join("without-client.toml");
    fs::write(&without_client, "[logging]\nlevel = \"warn\"\n").unwrap();
    let result = load_bootstrap_config(Some(without_client.to_str().unwrap()));
    assert!(matches!(result, Err(ConfigError::Missing { field }) if field == "auth.client_id"));

    let with_client = dir.path().join("with-client.toml");
    fs::write(&with_client, "[auth]\nclient_id = \"client-123\"\n").unwrap();
    let config = load_bootstrap_config(Some(with_client.to_str().unwrap())).unwrap();
    assert_eq!(config.auth.client_id.as_deref(), Some("client-123"));
    assert!(config.endpoint.id.is_empty());
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    use globus_share::config::load_config;

    let result = load_config(Some("/nonexistent/globus-share.toml"));
    assert!(result.is_err());
}
