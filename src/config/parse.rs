use super::types::*;
use crate::config::{expand_env_vars, expand_tilde};
use regex::Regex;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    use std::io::Read;

    let mut file = File::open(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open config file '{}': {}", path.display(), e),
        ))
    })?;

    let mut yaml_string = String::new();
    file.read_to_string(&mut yaml_string).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string)
}

/// Parse and validate config from a YAML string
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let yaml_string = expand_env_vars(yaml);
    check_unexpanded_vars(&yaml_string)?;

    // An empty document means "all defaults"
    let mut config: Config = if yaml_string.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&yaml_string)?
    };

    if let Some(path) = &config.kubernetes.token_path {
        config.kubernetes.token_path = Some(expand_tilde(path));
    }

    validate_config(&config)?;

    Ok(config)
}

fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
    let mut unexpanded_vars: Vec<String> = re
        .captures_iter(yaml_string)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect();

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    unexpanded_vars.sort();
    unexpanded_vars.dedup();

    Err(ConfigError::Validation(format!(
        "environment variables are not set: {}",
        unexpanded_vars.join(", ")
    )))
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    let api_url = &config.kubernetes.api_url;
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        errors.push(format!(
            "kubernetes.api_url must be an http(s) URL, got '{}'",
            api_url
        ));
    }

    if config.kubernetes.container.trim().is_empty() {
        errors.push("kubernetes.container must not be empty".to_string());
    }

    if config.fetch.default_limit == 0 {
        errors.push("fetch.default_limit must be greater than 0".to_string());
    }

    if config.fetch.min_entries_per_source == 0 {
        errors.push("fetch.min_entries_per_source must be greater than 0".to_string());
    }

    if config.fetch.bytes_per_entry == 0 {
        errors.push("fetch.bytes_per_entry must be greater than 0".to_string());
    }

    if config.fetch.max_concurrent_sources == Some(0) {
        errors.push("fetch.max_concurrent_sources must be greater than 0".to_string());
    }

    if config.web.listen.parse::<std::net::SocketAddr>().is_err() {
        errors.push(format!(
            "web.listen must be a socket address, got '{}'",
            config.web.listen
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}
