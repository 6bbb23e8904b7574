//! Weight and architecture file loading shared by the candle backends.

use crate::core::config::ConfigValidator;
use crate::core::constants::{MODEL_CONFIG_FILE, SAFETENSORS_WEIGHTS_FILE};
use crate::core::errors::{DoodleError, DoodleResult};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Convert Candle error to DoodleError for inference operations.
pub fn candle_to_inference(
    model_name: &str,
    context: impl Into<String>,
    err: candle_core::Error,
) -> DoodleError {
    DoodleError::inference_error(model_name, context, err)
}

/// Reads the optional architecture file of a variant directory.
///
/// Falls back to `T::default()` when the file is absent.
///
/// # Errors
///
/// `ModelLoad` if the file exists but cannot be read, parsed or validated.
pub fn load_architecture<T>(model_dir: &Path) -> DoodleResult<T>
where
    T: DeserializeOwned + Default + ConfigValidator,
{
    let path = model_dir.join(MODEL_CONFIG_FILE);
    let config = if path.exists() {
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            DoodleError::model_load_error(&path, "cannot read architecture file", None, Some(e))
        })?;
        serde_json::from_str::<T>(&contents).map_err(|e| {
            DoodleError::model_load_error(&path, "malformed architecture file", None, Some(e))
        })?
    } else {
        debug!("No {} in {}, using default architecture", MODEL_CONFIG_FILE, model_dir.display());
        T::default()
    };

    config.validate().map_err(|e| {
        DoodleError::model_load_error(&path, "invalid architecture", None, Some(e))
    })?;
    Ok(config)
}

/// Reads `model.safetensors` from a variant directory into a [`VarBuilder`].
///
/// The file is read into memory, so the weights stay valid if the file is
/// replaced while the model is in use.
///
/// # Errors
///
/// `ModelLoad` if the file is missing or is not a valid safetensors archive.
pub fn load_var_builder(model_dir: &Path, device: &Device) -> DoodleResult<VarBuilder<'static>> {
    let path = model_dir.join(SAFETENSORS_WEIGHTS_FILE);
    if !path.is_file() {
        return Err(DoodleError::model_load_error(
            &path,
            "weights file not found",
            Some("check the model directory and variant name"),
            None::<std::io::Error>,
        ));
    }

    let bytes = std::fs::read(&path).map_err(|e| {
        DoodleError::model_load_error(&path, "cannot read weights file", None, Some(e))
    })?;
    debug!("Read {} bytes of weights from {}", bytes.len(), path.display());

    VarBuilder::from_buffered_safetensors(bytes, DType::F32, device).map_err(|e| {
        DoodleError::model_load_error(&path, "corrupt weights file", None, Some(e))
    })
}

/// Wraps a layer construction failure (missing tensor, wrong shape) as `ModelLoad`.
pub fn layer_load_error(model_dir: &Path, layer: &str, err: candle_core::Error) -> DoodleError {
    DoodleError::model_load_error(
        model_dir.join(SAFETENSORS_WEIGHTS_FILE),
        format!("weights do not match the architecture at layer '{}'", layer),
        Some("make sure config.json describes the exported network"),
        Some(err),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::FeedForwardConfig;

    #[test]
    fn test_missing_weights_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_var_builder(dir.path(), &Device::Cpu)
            .err()
            .expect("loading from an empty directory must fail");
        assert!(matches!(err, DoodleError::ModelLoad { .. }));
        assert!(err.to_string().contains("weights file not found"));
    }

    #[test]
    fn test_corrupt_weights_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SAFETENSORS_WEIGHTS_FILE), b"not safetensors").unwrap();
        let err = load_var_builder(dir.path(), &Device::Cpu)
            .err()
            .expect("garbage weights must be rejected");
        assert!(matches!(err, DoodleError::ModelLoad { .. }));
    }

    #[test]
    fn test_architecture_defaults_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let config: FeedForwardConfig = load_architecture(dir.path()).unwrap();
        assert_eq!(config, FeedForwardConfig::default());
    }

    #[test]
    fn test_malformed_architecture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MODEL_CONFIG_FILE), "{ hidden_sizes: ").unwrap();
        let err = load_architecture::<FeedForwardConfig>(dir.path()).unwrap_err();
        assert!(matches!(err, DoodleError::ModelLoad { .. }));
    }

    #[test]
    fn test_invalid_architecture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MODEL_CONFIG_FILE), r#"{"num_classes": 0}"#).unwrap();
        let err = load_architecture::<FeedForwardConfig>(dir.path()).unwrap_err();
        assert!(err.to_string().contains("invalid architecture"));
    }
}
