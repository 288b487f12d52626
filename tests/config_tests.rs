use podlog::config::{load_config, load_or_default, ConfigError};
use podlog::fetch::FetchSettings;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_full_config_loads() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    let token_path = temp_dir.path().join("token");
    fs::write(&token_path, "secret\n").unwrap();

    let config_yaml = format!(
        r#"
kubernetes:
  api_url: https://10.0.0.1:6443
  token_path: {}
  container: app
  request_timeout: 10s
  accept_invalid_certs: true

selector:
  base: "team=payments"

fetch:
  default_limit: 250
  min_entries_per_source: 20
  bytes_per_entry: 4096
  max_concurrent_sources: 16
  carry_forward_cursors: true
  page_timeout: 1m

web:
  listen: "0.0.0.0:9000"
"#,
        token_path.display()
    );
    fs::write(&config_path, config_yaml).unwrap();

    let config = load_config(&config_path).expect("config should be valid");

    assert_eq!(config.kubernetes.api_url, "https://10.0.0.1:6443");
    assert_eq!(config.kubernetes.token_path.as_deref(), Some(token_path.as_path()));
    assert_eq!(config.kubernetes.container, "app");
    assert_eq!(config.kubernetes.request_timeout, Duration::from_secs(10));
    assert!(config.kubernetes.accept_invalid_certs);
    assert_eq!(config.selector.base, "team=payments");
    assert_eq!(config.fetch.default_limit, 250);
    assert_eq!(config.fetch.page_timeout, Some(Duration::from_secs(60)));
    assert_eq!(config.web.listen, "0.0.0.0:9000");

    let settings = FetchSettings::from(&config);
    assert_eq!(settings.container, "app");
    assert_eq!(settings.min_entries_per_source, 20);
    assert_eq!(settings.bytes_per_entry, 4096);
    assert_eq!(settings.max_concurrent_sources, Some(16));
    assert!(settings.carry_forward_cursors);
}

#[test]
fn test_env_vars_expanded_in_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    std::env::set_var("PODLOG_CONFIG_TEST_API", "http://127.0.0.1:8001");

    fs::write(
        &config_path,
        "kubernetes:\n  api_url: $env{PODLOG_CONFIG_TEST_API}\n",
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    assert_eq!(config.kubernetes.api_url, "http://127.0.0.1:8001");

    std::env::remove_var("PODLOG_CONFIG_TEST_API");
}

#[test]
fn test_invalid_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, "fetch: [unclosed").unwrap();

    let result = load_config(&config_path);
    assert!(matches!(result, Err(ConfigError::YamlParse(_))));
}

#[test]
fn test_wrong_type() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, "fetch:\n  default_limit: lots\n").unwrap();

    assert!(load_config(&config_path).is_err());
}

#[test]
fn test_zero_concurrency_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, "fetch:\n  max_concurrent_sources: 0\n").unwrap();

    match load_config(&config_path) {
        Err(ConfigError::ValidationList(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("max_concurrent_sources"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_missing_file() {
    let result = load_config(std::path::Path::new("/nonexistent/podlog/config.yml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_explicit_path_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, "selector:\n  base: \"\"\n").unwrap();

    let config = load_or_default(Some(&config_path)).unwrap();
    assert_eq!(config.selector.base, "");
}
