//! ONNX Runtime backend for exported doodle models.

use super::ModelVariant;
use crate::core::batch::TensorD;
use crate::core::constants::{MODEL_INPUT_LEN, MODEL_INPUT_SIDE, NUM_CLASSES, ONNX_WEIGHTS_FILE};
use crate::core::errors::{DoodleError, DoodleResult, SimpleError};
use crate::core::traits::Classifier;
use ndarray::{ArrayView1, IxDyn};
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A doodle classifier backed by a single ONNX Runtime session.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    model_name: String,
    model_path: PathBuf,
    input_name: String,
    output_name: String,
    input_shape: Vec<usize>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("model_name", &self.model_name)
            .field("model_path", &self.model_path)
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_shape", &self.input_shape)
            .finish()
    }
}

impl OnnxClassifier {
    /// Loads `model.onnx` from a variant directory.
    ///
    /// The feed-forward export takes a `[1, 784]` input and the convolutional
    /// export a `[1, 1, 28, 28]` input.
    ///
    /// # Errors
    ///
    /// `ModelLoad` if the file is missing or ONNX Runtime rejects it.
    pub fn from_dir(model_dir: impl AsRef<Path>, variant: ModelVariant) -> DoodleResult<Self> {
        let path = model_dir.as_ref().join(ONNX_WEIGHTS_FILE);
        if !path.is_file() {
            return Err(DoodleError::model_load_error(
                &path,
                "ONNX model not found",
                Some("export the model to model.onnx inside the variant directory"),
                None::<std::io::Error>,
            ));
        }

        let session = Session::builder()?
            .with_log_level(LogLevel::Error)?
            .commit_from_file(&path)
            .map_err(|e| {
                DoodleError::model_load_error(
                    &path,
                    "failed to create ONNX session",
                    Some("verify the model was exported with a compatible opset"),
                    Some(e),
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| {
                DoodleError::model_load_error(
                    &path,
                    "model declares no inputs",
                    None,
                    None::<std::io::Error>,
                )
            })?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                DoodleError::model_load_error(
                    &path,
                    "model declares no outputs",
                    None,
                    None::<std::io::Error>,
                )
            })?;

        let side = MODEL_INPUT_SIDE as usize;
        let input_shape = match variant {
            ModelVariant::FeedForward => vec![1, MODEL_INPUT_LEN],
            ModelVariant::Convolutional => vec![1, 1, side, side],
        };

        Ok(Self {
            session: Mutex::new(session),
            model_name: format!("{}.onnx", variant.dir_name()),
            model_path: path,
            input_name,
            output_name,
            input_shape,
        })
    }

    /// Returns the model path associated with this session.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn input_len(&self) -> usize {
        MODEL_INPUT_LEN
    }

    fn num_classes(&self) -> usize {
        NUM_CLASSES
    }

    fn logits(&self, input: ArrayView1<'_, f32>) -> DoodleResult<Vec<f32>> {
        let array = TensorD::from_shape_vec(IxDyn(&self.input_shape), input.to_vec())
            .map_err(|e| {
                DoodleError::inference_error(
                    &self.model_name,
                    format!("cannot reshape input to {:?}", self.input_shape),
                    e,
                )
            })?;

        let input_tensor = TensorRef::from_array_view(array.view()).map_err(|e| {
            DoodleError::inference_error(&self.model_name, "tensor conversion", e)
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self.session.lock().map_err(|_| {
            DoodleError::inference_error(
                &self.model_name,
                "failed to acquire session lock",
                SimpleError::new("session lock poisoned"),
            )
        })?;
        let outputs = session.run(inputs).map_err(|e| {
            DoodleError::inference_error(&self.model_name, "forward pass", e)
        })?;

        let (_, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                DoodleError::inference_error(
                    &self.model_name,
                    format!("failed to extract output '{}' as f32", self.output_name),
                    e,
                )
            })?;
        Ok(data.to_vec())
    }
}
