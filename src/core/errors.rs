//! Error types for the doodle recognition pipeline.
//!
//! Every fallible operation in the crate returns [`DoodleError`]. The variants
//! follow the stages of the pipeline: canvas input, preprocessing, model
//! loading and inference. Helper constructors build the variants that carry
//! boxed sources so call sites stay short.

use std::path::PathBuf;
use thiserror::Error;

/// Stage of the pipeline where a processing error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProcessingStage {
    /// Intensity scaling produced values the model cannot take.
    Normalization,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Normalization => write!(f, "normalization"),
        }
    }
}

/// A plain message usable as the source of another error.
#[derive(Debug, Clone)]
pub struct SimpleError(String);

impl SimpleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SimpleError {}

/// Errors that can occur while capturing, preprocessing or classifying a doodle.
#[derive(Error, Debug)]
pub enum DoodleError {
    /// The raster or another input value is malformed or empty.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// A snapshot file could not be opened or decoded.
    #[error("failed to load image '{}'", path.display())]
    ImageLoad {
        /// Path of the image that failed to load.
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The raster snapshot could not be written.
    #[error("failed to save image '{}'", path.display())]
    ImageSave {
        /// Destination path.
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Model weights or model configuration could not be loaded.
    #[error("failed to load model '{model_path}': {reason}{suggestion}")]
    ModelLoad {
        /// Path of the weights or configuration file.
        model_path: String,
        /// What went wrong.
        reason: String,
        /// Optional hint, already formatted with its leading separator.
        suggestion: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The input tensor length does not match what the model expects.
    #[error("model '{model_name}' expects an input of {expected} values, got {actual}")]
    ShapeMismatch {
        /// Name of the model that rejected the input.
        model_name: String,
        /// Expected number of input values.
        expected: usize,
        /// Actual number of input values.
        actual: usize,
    },

    /// The model failed while running a forward pass.
    #[error("inference failed for model '{model_name}': {context}")]
    Inference {
        /// Name of the model.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A preprocessing or post-processing step failed.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A configuration value is invalid.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[cfg(feature = "onnx")]
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for doodle operations.
pub type DoodleResult<T> = Result<T, DoodleError>;

impl DoodleError {
    /// Creates an `InvalidInput` error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a `ConfigError`.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a `ModelLoad` error.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path of the file that failed to load.
    /// * `reason` - Short description of the failure.
    /// * `suggestion` - Optional hint appended to the message.
    /// * `source` - Optional underlying error.
    pub fn model_load_error(
        model_path: impl AsRef<std::path::Path>,
        reason: impl Into<String>,
        suggestion: Option<&str>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let suggestion = suggestion
            .map(|s| format!("; suggested fix: {}", s))
            .unwrap_or_default();
        Self::ModelLoad {
            model_path: model_path.as_ref().display().to_string(),
            reason: reason.into(),
            suggestion,
            source: source.map(|e| Box::new(e) as _),
        }
    }

    /// Creates a `ShapeMismatch` error.
    pub fn shape_mismatch(model_name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            model_name: model_name.into(),
            expected,
            actual,
        }
    }

    /// Creates an `Inference` error.
    pub fn inference_error(
        model_name: &str,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a `Processing` error for the given stage.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Returns true for malformed input: an invalid raster or an unreadable image file.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::ImageLoad { .. })
    }

    /// Returns true when the error signals a broken contract between pipeline
    /// components rather than a problem with the user's drawing.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_load_error_formats_suggestion() {
        let err = DoodleError::model_load_error(
            "models/convolutional/model.safetensors",
            "weights file not found",
            Some("check the model directory"),
            None::<std::io::Error>,
        );
        let message = err.to_string();
        assert!(message.contains("models/convolutional/model.safetensors"));
        assert!(message.contains("suggested fix: check the model directory"));
    }

    #[test]
    fn test_error_classification() {
        assert!(DoodleError::shape_mismatch("ff", 784, 783).is_contract_violation());
        assert!(!DoodleError::shape_mismatch("ff", 784, 783).is_invalid_input());
        assert!(DoodleError::invalid_input("empty raster").is_invalid_input());
        assert!(!DoodleError::config_error("bad").is_invalid_input());
    }

    #[test]
    fn test_processing_error_names_stage() {
        let err = DoodleError::processing(
            ProcessingStage::Normalization,
            "non-finite value",
            SimpleError::new("alpha overflowed"),
        );
        assert_eq!(err.to_string(), "normalization failed: non-finite value");
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = DoodleError::shape_mismatch("feed_forward", 784, 783);
        assert_eq!(
            err.to_string(),
            "model 'feed_forward' expects an input of 784 values, got 783"
        );
    }
}
