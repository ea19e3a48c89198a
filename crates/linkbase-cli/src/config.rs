//! CLI configuration

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use linkbase_core::{DEFAULT_NEIGHBORHOOD_DEPTH, DEFAULT_PATH_MAX_DEPTH};

/// Environment variable that points at an alternate config file
pub const CONFIG_ENV: &str = "LINKBASE_CONFIG";

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("linkbase")
}

/// Location of the config file
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("linkbase")
        .join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub default_depth: u32,
    pub default_max_depth: u32,
    /// Zero disables the query timeout
    pub query_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_depth: DEFAULT_NEIGHBORHOOD_DEPTH,
            default_max_depth: DEFAULT_PATH_MAX_DEPTH,
            query_timeout_secs: 30,
            log_file: None,
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it is absent
    /// or unreadable
    pub fn load() -> Self {
        let path = config_file_path();
        match Self::load_from(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                eprintln!("Warning: ignoring config file {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    fn load_from(path: &std::path::Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&content)?;
        Ok(Some(config))
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "data_dir",
            "default_depth",
            "default_max_depth",
            "query_timeout_secs",
            "log_file",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(self.data_dir.display().to_string()),
            "default_depth" => Some(self.default_depth.to_string()),
            "default_max_depth" => Some(self.default_max_depth.to_string()),
            "query_timeout_secs" => Some(self.query_timeout_secs.to_string()),
            "log_file" => self.log_file.as_ref().map(|p| p.display().to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "default_depth" => {
                self.default_depth = value
                    .parse()
                    .with_context(|| format!("default_depth must be a non-negative integer, got '{}'", value))?
            }
            "default_max_depth" => {
                self.default_max_depth = value
                    .parse()
                    .with_context(|| format!("default_max_depth must be a non-negative integer, got '{}'", value))?
            }
            "query_timeout_secs" => {
                self.query_timeout_secs = value
                    .parse()
                    .with_context(|| format!("query_timeout_secs must be a non-negative integer, got '{}'", value))?
            }
            "log_file" => {
                self.log_file = (!value.trim().is_empty()).then(|| PathBuf::from(value));
            }
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }

    /// Query timeout, `None` when disabled
    pub fn query_timeout(&self) -> Option<std::time::Duration> {
        (self.query_timeout_secs > 0).then(|| std::time::Duration::from_secs(self.query_timeout_secs))
    }
}
