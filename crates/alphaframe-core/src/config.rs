//! Client configuration, loaded from YAML and the environment.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;
use crate::retry::RetryPolicy;
use crate::AlphaError;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const API_KEYS_ENV: &str = "ALPHAFRAME_API_KEYS";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// ```yaml
/// alpha_vantage_api_key_list: [KEY1, KEY2]
/// vpn_proxies:
///   http: http://10.0.0.1:3128
///   https: http://10.0.0.1:3128
/// log_level: INFO
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(alias = "alpha_vantage_api_key_list")]
    pub api_keys: Vec<String>,
    /// Scheme (`http`, `https` or `all`) to proxy URL. Empty disables proxies.
    #[serde(alias = "vpn_proxies", deserialize_with = "nullable_map")]
    pub proxies: BTreeMap<String, String>,
    pub log_level: String,
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub retry: RetryPolicy,
    /// Concurrent slice downloads; defaults to cores minus one.
    pub max_workers: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            proxies: BTreeMap::new(),
            log_level: String::from("INFO"),
            base_url: String::from(DEFAULT_BASE_URL),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            retry: RetryPolicy::default(),
            max_workers: None,
        }
    }
}

impl ClientConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AlphaError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, AlphaError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AlphaError::configuration(format!("cannot read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Replaces the keys with `ALPHAFRAME_API_KEYS` (comma-separated) when set.
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(API_KEYS_ENV) {
            Ok(value) => self.with_api_keys_from(&value),
            Err(_) => self,
        }
    }

    fn with_api_keys_from(mut self, value: &str) -> Self {
        let keys = value
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if !keys.is_empty() {
            self.api_keys = keys;
        }
        self
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(&self.log_level)
    }
}

fn nullable_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}
