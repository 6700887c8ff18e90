//! Serializable sink settings, loadable from YAML, TOML or JSON files.

use crate::error::{FileSinkError, Result};
use crate::flush::FlushMode;
use crate::sink::FileSink;
use figment::{
    providers::{Format, Json, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings needed to construct a [`FileSink`].
///
/// ```yaml
/// path: logs/app.log
/// flush_mode: manual   # optional, defaults to "always"
/// ```
///
/// A relative `path` is resolved against the current working directory
/// when the sink is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSinkConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub flush_mode: FlushMode,
}

impl FileSinkConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flush_mode: FlushMode::default(),
        }
    }

    pub fn with_flush_mode(mut self, flush_mode: FlushMode) -> Self {
        self.flush_mode = flush_mode;
        self
    }

    /// Load settings from a configuration file, picking the format from the
    /// file extension (`yaml`/`yml`, `toml` or `json`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FileSinkError::config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let figment = match extension.as_str() {
            "yaml" | "yml" => Figment::from(Yaml::file(path)),
            "toml" => Figment::from(Toml::file(path)),
            "json" => Figment::from(Json::file(path)),
            other => {
                return Err(FileSinkError::config(format!(
                    "unsupported configuration format '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };

        let config: Self = figment.extract()?;
        debug!(
            "Loaded file sink configuration from {}: path={}, flush_mode={}",
            path.display(),
            config.path.display(),
            config.flush_mode
        );
        Ok(config)
    }

    /// Construct the sink these settings describe.
    pub fn build(&self) -> Result<FileSink> {
        FileSink::new(&self.path, self.flush_mode)
    }
}
