//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/clustree/clustree.toml`
//! 3. Explicit config file (`--config <file>`)
//! 4. Environment variables: `CLUSTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::DEFAULT_PERIOD;
use crate::tree_traits::RenderStyle;

#[derive(Error, Debug)]
#[error("config error: {message}")]
pub struct ConfigError {
    pub message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn config_err(e: config::ConfigError) -> ConfigError {
    ConfigError::new(e.to_string())
}

/// Settings for inspecting cluster forests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Period used for weights and sentiment (default: "total")
    pub default_period: String,
    /// Keywords shown per node in listings
    pub max_keywords: usize,
    /// Show sentiment scores in node details
    pub show_sentiment: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_period: DEFAULT_PERIOD.to_string(),
            max_keywords: 5,
            show_sentiment: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub default_period: Option<String>,
    pub max_keywords: Option<usize>,
    pub show_sentiment: Option<bool>,
}

/// Get the XDG config directory for clustree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "clustree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("clustree.toml"))
}

/// Load a TOML file into RawSettings for merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::new(format!("read {}: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| ConfigError::new(format!("parse {}: {}", path.display(), e)))
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            default_period: overlay
                .default_period
                .clone()
                .unwrap_or_else(|| self.default_period.clone()),
            max_keywords: overlay.max_keywords.unwrap_or(self.max_keywords),
            show_sentiment: overlay.show_sentiment.unwrap_or(self.show_sentiment),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            debug!("loading config: {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply CLUSTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("CLUSTREE").try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("default_period") {
            settings.default_period = val;
        }
        if let Ok(val) = config.get_int("max_keywords") {
            settings.max_keywords = usize::try_from(val)
                .map_err(|_| ConfigError::new(format!("max_keywords must be >= 0, got {}", val)))?;
        }
        if let Ok(val) = config.get_bool("show_sentiment") {
            settings.show_sentiment = val;
        }

        Ok(settings)
    }

    /// Render settings as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::new(e.to_string()))
    }

    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            period: self.default_period.clone(),
            max_keywords: self.max_keywords,
        }
    }
}
