// src/config.rs

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::blocklist::Blocklist;
use crate::crtsh::FetchSettings;
use crate::crtsh::client::{DEFAULT_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT};
use crate::search::DEFAULT_WORKERS;

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_concurrency() -> usize { DEFAULT_WORKERS }
fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT.as_secs() }
fn default_max_retries() -> u32 { DEFAULT_MAX_RETRIES }
fn default_retry_delay_secs() -> u64 { DEFAULT_RETRY_DELAY.as_secs() }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl SearchConfig {
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            ..FetchSettings::default()
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BlocklistConfig {
    #[serde(default)]
    pub suffixes: Vec<String>,  // merged with the built-in defaults
    #[serde(default)]
    pub file: Option<String>,
}

impl BlocklistConfig {
    /// Defaults + configured suffixes + configured file + `extra_file`
    pub fn build(&self, extra_file: Option<&Path>) -> Blocklist {
        let mut blocklist = Blocklist::default().with_suffixes(&self.suffixes);

        if let Some(ref file) = self.file {
            blocklist = blocklist.with_file(Path::new(file));
        }
        if let Some(path) = extra_file {
            blocklist = blocklist.with_file(path);
        }

        blocklist
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "warn".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub blocklist: BlocklistConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    /// Load `path` if given, otherwise use the defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
