//! # Server Configuration
//!
//! Settings are read from an optional TOML file and then overridden from the
//! environment:
//!
//! | source              | effect                                   |
//! |---------------------|------------------------------------------|
//! | `DOCMERGE_CONFIG`   | path of the TOML file (`docmerge.toml`)  |
//! | `DOCMERGE_HOST`     | `server.host`                            |
//! | `DOCMERGE_PORT`     | `server.port`                            |
//! | `DOCMERGE_LOG`      | `server.log_filter`                      |
//!
//! A missing file means defaults. Every key may be omitted.
//!
//! ```toml
//! [server]
//! port = 9000
//!
//! [merge]
//! multi_template = true
//! identifying_columns = ["name", "STT"]
//! ```

use crate::engine::filename::DEFAULT_IDENTIFYING_COLUMNS;
use crate::engine::session::MergeOptions;
use crate::job_controller::state::DEFAULT_RETAINED_REPORTS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "DOCMERGE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "docmerge.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value `{value}` for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub merge: MergeSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for one multipart upload, in bytes.
    pub max_upload_bytes: usize,
    /// `env_logger` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Finished merge jobs whose documents stay downloadable.
    pub retained_reports: usize,
}

const fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024 // 20 MiB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: default_max_upload_bytes(),
            log_filter: "info".to_string(),
            retained_reports: DEFAULT_RETAINED_REPORTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    pub multi_template: bool,
    pub auto_suggest: bool,
    pub parallel: bool,
    pub identifying_columns: Vec<String>,
    pub output_extension: String,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            multi_template: false,
            auto_suggest: true,
            parallel: false,
            identifying_columns: DEFAULT_IDENTIFYING_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            output_extension: "docx".to_string(),
        }
    }
}

impl From<&MergeSettings> for MergeOptions {
    fn from(settings: &MergeSettings) -> Self {
        MergeOptions {
            multi_template: settings.multi_template,
            auto_suggest: settings.auto_suggest,
            parallel: settings.parallel,
            identifying_columns: settings.identifying_columns.clone(),
            output_extension: settings.output_extension.clone(),
            date_stamp: None,
        }
    }
}

impl AppConfig {
    /// Loads the file named by `DOCMERGE_CONFIG` (or `docmerge.toml`) and
    /// applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = Self::load_with_optional(&path)?;
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Defaults when `path` does not exist.
    pub fn load_with_optional(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `DOCMERGE_*` overrides looked up through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("DOCMERGE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DOCMERGE_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "DOCMERGE_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(filter) = lookup("DOCMERGE_LOG") {
            self.server.log_filter = filter;
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions::from(&self.merge)
    }
}
