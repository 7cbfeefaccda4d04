// TOML config adapter - Loads typed settings from a TOML file

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::Settings;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "stackclip.toml";

/// TOML configuration adapter
#[derive(Debug, Clone)]
pub struct TomlConfigAdapter {
    explicit_path: Option<PathBuf>,
    search_dir: PathBuf,
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter. An explicit path must exist; otherwise
    /// `stackclip.toml` in the working directory is used when present.
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        Self {
            explicit_path,
            search_dir: PathBuf::from("."),
        }
    }

    /// Look for the default config file in `dir` instead of the working directory
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = dir.into();
        self
    }

    /// Get default config file path
    pub fn default_config_path(&self) -> PathBuf {
        self.search_dir.join(DEFAULT_CONFIG_FILE)
    }

    /// Parse settings from TOML text; omitted keys keep their defaults
    pub fn parse_settings(content: &str) -> Result<Settings, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::ConfigError(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load settings and report which file they came from, if any
    pub fn load(&self) -> Result<(Settings, Option<PathBuf>), DomainError> {
        let path = match &self.explicit_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(DomainError::ConfigError(format!(
                        "Config file does not exist: {}",
                        path.display()
                    )));
                }
                path.clone()
            }
            None => {
                let candidate = self.default_config_path();
                if !candidate.is_file() {
                    debug!(path = %candidate.display(), "No config file, using defaults");
                    return Ok((Settings::default(), None));
                }
                candidate
            }
        };

        let settings = Self::read(&path)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok((settings, Some(path)))
    }

    fn read(path: &Path) -> Result<Settings, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse_settings(&content)
    }
}
