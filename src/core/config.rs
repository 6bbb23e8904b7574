//! Configuration types, validation and loading.
//!
//! Each component owns its configuration section ([`CanvasConfig`],
//! [`PreprocessConfig`], [`ModelConfig`]); [`DoodleConfig`] aggregates them so
//! a whole application can be configured from one JSON file. Every section
//! implements [`ConfigValidator`].

use crate::canvas::CanvasConfig;
use crate::core::constants::DEFAULT_SNAPSHOT_PATH;
use crate::core::errors::DoodleError;
use crate::models::ModelConfig;
use crate::processors::PreprocessConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A configuration file could not be read or parsed.
    #[error("failed to read configuration '{}': {message}", path.display())]
    LoadFailed { path: PathBuf, message: String },
}

impl From<ConfigError> for DoodleError {
    fn from(err: ConfigError) -> Self {
        DoodleError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// A trait for validating configuration sections.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DoodleConfig {
    /// Drawing surface settings.
    pub canvas: CanvasConfig,
    /// Raster to tensor conversion settings.
    pub preprocess: PreprocessConfig,
    /// Model variant and weight location.
    pub model: ModelConfig,
    /// Where the raster snapshot is written on save.
    pub snapshot_path: PathBuf,
}

impl Default for DoodleConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            preprocess: PreprocessConfig::default(),
            model: ModelConfig::default(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

impl DoodleConfig {
    /// Loads and validates a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&contents).map_err(|e| match e {
            ConfigError::LoadFailed { message, .. } => ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DoodleConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("<inline>"),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }
}

impl ConfigValidator for DoodleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.canvas.validate()?;
        self.preprocess.validate()?;
        self.model.validate()?;
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "snapshot_path cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
