//! Capture-to-label orchestration.
//!
//! [`DoodlePipeline`] chains preprocessing, classification and presentation
//! for any RGB image. [`DoodleSession`] adds the drawing surface, routes
//! pointer events and runs the predict state machine on the current drawing.

mod presenter;
mod session;
mod stats;

pub use presenter::{Presentation, PredictionPresenter};
pub use session::{DoodleSession, PipelineState};
pub use stats::PipelineStats;

use crate::core::batch::Tensor1D;
use crate::core::errors::DoodleResult;
use crate::core::traits::ClassifierHandle;
use crate::domain::Prediction;
use crate::processors::Preprocessor;
use crate::utils::load_images_batch;
use image::RgbImage;
use std::path::Path;
use tracing::debug;

/// Prediction plus its rendered text.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub prediction: Prediction,
    pub presentation: Presentation,
}

/// Preprocessor, classifier and presenter wired together.
///
/// The pipeline holds no mutable state; one instance can classify any number
/// of images.
#[derive(Debug, Clone)]
pub struct DoodlePipeline {
    preprocessor: Preprocessor,
    classifier: ClassifierHandle,
    presenter: PredictionPresenter,
}

impl DoodlePipeline {
    pub fn new(
        preprocessor: Preprocessor,
        classifier: ClassifierHandle,
        presenter: PredictionPresenter,
    ) -> Self {
        Self {
            preprocessor,
            classifier,
            presenter,
        }
    }

    /// Builds a pipeline with the default preprocessor and category table.
    pub fn with_classifier(classifier: ClassifierHandle) -> Self {
        Self::new(
            Preprocessor::default(),
            classifier,
            PredictionPresenter::default(),
        )
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn classifier(&self) -> &ClassifierHandle {
        &self.classifier
    }

    pub fn presenter(&self) -> &PredictionPresenter {
        &self.presenter
    }

    /// Converts a raster into the model input.
    pub fn preprocess(&self, image: &RgbImage) -> DoodleResult<Tensor1D> {
        self.preprocessor.process(image)
    }

    /// Runs the classifier on a preprocessed tensor.
    pub fn classify(&self, tensor: &Tensor1D) -> DoodleResult<Prediction> {
        self.classifier.predict(tensor)
    }

    /// Renders a prediction as text.
    pub fn present(&self, prediction: &Prediction) -> DoodleResult<Presentation> {
        self.presenter.format(prediction)
    }

    /// Classifies one raster end to end.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` for an empty raster
    /// * `ShapeMismatch` if the preprocessor output does not fit the model
    /// * `Inference` if the model fails
    pub fn run(&self, image: &RgbImage) -> DoodleResult<PipelineOutput> {
        let tensor = self.preprocess(image)?;
        let prediction = self.classify(&tensor)?;
        let presentation = self.present(&prediction)?;
        Ok(PipelineOutput {
            prediction,
            presentation,
        })
    }

    /// Classifies saved image files.
    ///
    /// Images are loaded in parallel (see [`load_images_batch`]) and then
    /// classified one after another in input order.
    ///
    /// # Errors
    ///
    /// Fails on the first image that cannot be loaded or classified.
    pub fn run_files<P: AsRef<Path> + Send + Sync>(
        &self,
        paths: &[P],
    ) -> DoodleResult<Vec<PipelineOutput>> {
        let images = load_images_batch(paths)?;
        debug!("Loaded {} images for classification", images.len());
        images.iter().map(|image| self.run(image)).collect()
    }
}

#[cfg(test)]
pub(crate) mod test_doubles {
    use crate::core::errors::{DoodleError, DoodleResult, SimpleError};
    use crate::core::traits::Classifier;
    use ndarray::ArrayView1;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Returns fixed logits, or fails while `failing` is set.
    #[derive(Debug)]
    pub struct ScriptedClassifier {
        pub logits: Vec<f32>,
        pub input_len: usize,
        pub failing: AtomicBool,
    }

    impl ScriptedClassifier {
        pub fn favoring(class: usize) -> Self {
            let mut logits = vec![0.0; 10];
            logits[class] = 4.0;
            Self {
                logits,
                input_len: 784,
                failing: AtomicBool::new(false),
            }
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl Classifier for ScriptedClassifier {
        fn name(&self) -> &str {
            "scripted"
        }

        fn input_len(&self) -> usize {
            self.input_len
        }

        fn num_classes(&self) -> usize {
            self.logits.len()
        }

        fn logits(&self, _input: ArrayView1<'_, f32>) -> DoodleResult<Vec<f32>> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(DoodleError::inference_error(
                    "scripted",
                    "forced failure",
                    SimpleError::new("backend unavailable"),
                ));
            }
            Ok(self.logits.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_doubles::ScriptedClassifier;
    use super::*;
    use crate::core::errors::DoodleError;
    use image::Rgb;
    use std::sync::Arc;

    #[test]
    fn test_run_on_blank_raster() {
        let pipeline = DoodlePipeline::with_classifier(Arc::new(ScriptedClassifier::favoring(7)));
        let image = RgbImage::from_pixel(800, 800, Rgb([0, 0, 0]));
        let output = pipeline.run(&image).unwrap();
        assert_eq!(output.prediction.class_index(), 7);
        assert_eq!(output.presentation.headline, "Prediction: Diamond");
        let sum: f64 = output.prediction.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_run_rejects_empty_raster() {
        let pipeline = DoodlePipeline::with_classifier(Arc::new(ScriptedClassifier::favoring(0)));
        let err = pipeline.run(&RgbImage::new(0, 10)).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_input_length_contract() {
        let classifier = ScriptedClassifier {
            input_len: 783,
            ..ScriptedClassifier::favoring(0)
        };
        let pipeline = DoodlePipeline::with_classifier(Arc::new(classifier));
        let err = pipeline
            .run(&RgbImage::from_pixel(28, 28, Rgb([0, 0, 0])))
            .unwrap_err();
        assert!(matches!(err, DoodleError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_run_files_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (0..3)
            .map(|i| {
                let path = dir.path().join(format!("doodle_{i}.png"));
                RgbImage::from_pixel(50, 50, Rgb([0, 0, 0])).save(&path).unwrap();
                path
            })
            .collect();

        let pipeline = DoodlePipeline::with_classifier(Arc::new(ScriptedClassifier::favoring(5)));
        let outputs = pipeline.run_files(&paths).unwrap();
        assert_eq!(outputs.len(), 3);
        assert!(outputs
            .iter()
            .all(|o| o.presentation.headline == "Prediction: Tree"));
    }

    #[test]
    fn test_run_files_missing_file() {
        let pipeline = DoodlePipeline::with_classifier(Arc::new(ScriptedClassifier::favoring(5)));
        let err = pipeline.run_files(&["no/such/doodle.png"]).unwrap_err();
        assert!(matches!(err, DoodleError::ImageLoad { .. }));
    }
}
