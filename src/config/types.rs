use crate::kube::selector::DEFAULT_BASE_SELECTOR;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
    #[serde(default)]
    pub selector: SelectorConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubernetesConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// File holding a bearer token for the API server
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_path: None,
            container: default_container(),
            request_timeout: default_request_timeout(),
            accept_invalid_certs: false,
        }
    }
}

fn default_api_url() -> String {
    "https://kubernetes.default.svc".to_string()
}

fn default_container() -> String {
    "application".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_base_selector")]
    pub base: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            base: default_base_selector(),
        }
    }
}

fn default_base_selector() -> String {
    DEFAULT_BASE_SELECTOR.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Floor on the entries budgeted to each pod, however many pods there are
    #[serde(default = "default_min_entries_per_source")]
    pub min_entries_per_source: usize,
    #[serde(default = "default_bytes_per_entry")]
    pub bytes_per_entry: u64,
    #[serde(default)]
    pub max_concurrent_sources: Option<usize>,
    #[serde(default)]
    pub carry_forward_cursors: bool,
    #[serde(default, with = "humantime_serde")]
    pub page_timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            min_entries_per_source: default_min_entries_per_source(),
            bytes_per_entry: default_bytes_per_entry(),
            max_concurrent_sources: None,
            carry_forward_cursors: false,
            page_timeout: None,
        }
    }
}

fn default_limit() -> usize {
    crate::fetch::types::DEFAULT_LIMIT
}

fn default_min_entries_per_source() -> usize {
    10
}

fn default_bytes_per_entry() -> u64 {
    3072
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:7106".to_string()
}
