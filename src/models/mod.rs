//! Pre-trained doodle classifiers.
//!
//! Two architectures are available, selected by [`ModelVariant`]:
//!
//! - [`FeedForwardNet`]: fully connected layers over the flattened raster
//! - [`ConvNet`]: convolution stages followed by a small classifier head
//!
//! Weights live in a per-variant directory, `<model_dir>/<variant>/`, as
//! `model.safetensors` with an optional `config.json`. With the `onnx`
//! feature, exported `model.onnx` files can be used instead.

pub mod config;
pub mod convolutional;
pub mod device;
pub mod feed_forward;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod weights;

pub use config::{ConvNetConfig, FeedForwardConfig};
pub use convolutional::ConvNet;
pub use device::parse_device;
pub use feed_forward::FeedForwardNet;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::{DEFAULT_MODEL_DIR, MODEL_INPUT_LEN, NUM_CLASSES};
use crate::core::errors::{DoodleError, DoodleResult, SimpleError};
use crate::core::traits::ClassifierHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Network architecture to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Fully connected network.
    FeedForward,
    /// Convolutional network.
    #[default]
    Convolutional,
}

impl ModelVariant {
    /// Name of the variant's weights directory.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ModelVariant::FeedForward => "feed_forward",
            ModelVariant::Convolutional => "convolutional",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for ModelVariant {
    type Err = DoodleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "feed_forward" | "simple" | "mlp" => Ok(ModelVariant::FeedForward),
            "convolutional" | "conv" | "cnn" => Ok(ModelVariant::Convolutional),
            other => Err(DoodleError::config_error(format!(
                "Unknown model variant: '{}'. Use 'feed_forward' or 'convolutional'",
                other
            ))),
        }
    }
}

/// On-disk weight format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightFormat {
    /// `model.safetensors`, run with candle.
    #[default]
    Safetensors,
    /// `model.onnx`, run with ONNX Runtime (requires the `onnx` feature).
    Onnx,
}

/// Which model to load and from where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Architecture to load.
    pub variant: ModelVariant,
    /// Directory containing one subdirectory per variant.
    pub model_dir: PathBuf,
    /// Weight format inside the variant directory.
    pub format: WeightFormat,
    /// Candle device: `cpu`, `cuda` or `cuda:N`.
    pub device: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            variant: ModelVariant::default(),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            format: WeightFormat::default(),
            device: "cpu".to_string(),
        }
    }
}

impl ModelConfig {
    /// Creates a configuration for `variant` under `model_dir`.
    pub fn new(variant: ModelVariant, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            variant,
            model_dir: model_dir.into(),
            ..Self::default()
        }
    }

    /// Directory holding the selected variant's files.
    pub fn variant_dir(&self) -> PathBuf {
        self.model_dir.join(self.variant.dir_name())
    }
}

impl ConfigValidator for ModelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "model_dir cannot be empty".to_string(),
            });
        }
        if self.device.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "device cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads the configured classifier.
///
/// Called once at startup; the returned handle is shared read-only by every
/// prediction afterwards.
///
/// # Errors
///
/// * `ModelLoad` if the weights or architecture file cannot be read, do not
///   match each other, or describe a model that does not take a 28x28 input
///   and score every category
/// * `ConfigError` for an invalid configuration, an unknown device, or the
///   ONNX format without the `onnx` feature
pub fn load_classifier(config: &ModelConfig) -> DoodleResult<ClassifierHandle> {
    config.validate()?;
    let dir = config.variant_dir();
    info!(
        "Loading {} classifier ({:?}) from {}",
        config.variant,
        config.format,
        dir.display()
    );

    let handle: ClassifierHandle = match config.format {
        WeightFormat::Safetensors => {
            let device = parse_device(&config.device)?;
            match config.variant {
                ModelVariant::FeedForward => Arc::new(FeedForwardNet::from_dir(&dir, device)?),
                ModelVariant::Convolutional => Arc::new(ConvNet::from_dir(&dir, device)?),
            }
        }
        WeightFormat::Onnx => {
            #[cfg(feature = "onnx")]
            {
                Arc::new(OnnxClassifier::from_dir(&dir, config.variant)?)
            }
            #[cfg(not(feature = "onnx"))]
            {
                return Err(DoodleError::config_error(
                    "ONNX support not enabled. Compile with --features onnx",
                ));
            }
        }
    };

    if handle.input_len() != MODEL_INPUT_LEN || handle.num_classes() != NUM_CLASSES {
        return Err(DoodleError::model_load_error(
            &dir,
            format!(
                "model takes {} inputs and scores {} classes, expected {} and {}",
                handle.input_len(),
                handle.num_classes(),
                MODEL_INPUT_LEN,
                NUM_CLASSES
            ),
            Some("input_size and num_classes in config.json must match the category table"),
            None::<SimpleError>,
        ));
    }

    info!(
        "Loaded classifier '{}' ({} inputs, {} classes)",
        handle.name(),
        handle.input_len(),
        handle.num_classes()
    );
    Ok(handle)
}
