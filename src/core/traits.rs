//! The classifier seam between the pipeline and the numeric backends.

use crate::core::batch::Tensor1D;
use crate::core::errors::{DoodleError, DoodleResult};
use crate::domain::Prediction;
use crate::processors::softmax::softmax;
use ndarray::ArrayView1;
use std::sync::Arc;

/// A loaded image classifier.
///
/// Backends implement [`Classifier::logits`]; the provided
/// [`Classifier::predict`] validates the input length at the boundary, turns
/// raw scores into a probability distribution and picks the top class.
/// Implementations must be pure: the same input always yields the same scores.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Human-readable model name used in logs and errors.
    fn name(&self) -> &str;

    /// Number of values the model consumes.
    fn input_len(&self) -> usize;

    /// Number of classes the model scores.
    fn num_classes(&self) -> usize;

    /// Runs the network and returns one raw score per class.
    ///
    /// Called only with inputs of length [`Classifier::input_len`].
    fn logits(&self, input: ArrayView1<'_, f32>) -> DoodleResult<Vec<f32>>;

    /// Classifies a preprocessed tensor.
    ///
    /// # Errors
    ///
    /// * `ShapeMismatch` if the tensor length differs from [`Classifier::input_len`]
    /// * `Inference` if the backend fails, returns the wrong number of scores,
    ///   or produces non-finite scores
    fn predict(&self, input: &Tensor1D) -> DoodleResult<Prediction> {
        if input.len() != self.input_len() {
            return Err(DoodleError::shape_mismatch(
                self.name(),
                self.input_len(),
                input.len(),
            ));
        }

        let scores = self.logits(input.view())?;
        if scores.len() != self.num_classes() {
            return Err(DoodleError::inference_error(
                self.name(),
                format!(
                    "expected {} class scores, got {}",
                    self.num_classes(),
                    scores.len()
                ),
                crate::core::errors::SimpleError::new("unexpected output length"),
            ));
        }

        let probabilities = softmax(&scores).map_err(|e| {
            DoodleError::inference_error(self.name(), "model produced unusable scores", e)
        })?;
        Prediction::from_probabilities(probabilities)
    }
}

/// Shared, read-only handle to a loaded classifier.
pub type ClassifierHandle = Arc<dyn Classifier>;
