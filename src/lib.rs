//! # Doodle Recognizer
//!
//! Capture freehand doodles and classify them with a pre-trained network into
//! one of ten categories: Clock, Boomerang, Airplane, Snail, Parachute, Tree,
//! Fish, Diamond, Helicopter and T-Shirt.
//!
//! ## Features
//!
//! - Stroke rasterization with round caps onto a fixed-size canvas
//! - Deterministic conversion of the canvas into a 28x28 model input
//! - Feed-forward and convolutional classifiers on candle (safetensors weights)
//! - Optional ONNX Runtime backend (`onnx` feature) and CUDA (`cuda` feature)
//! - Session state machine that keeps the last good result when a prediction fails
//!
//! ## Modules
//!
//! * [`canvas`] - Stroke capture and pointer events
//! * [`core`] - Configuration, errors, constants and the classifier trait
//! * [`domain`] - Category table and prediction results
//! * [`models`] - Classifier implementations and model loading
//! * [`pipeline`] - Pipeline, presenter and interactive session
//! * [`processors`] - Preprocessing, normalization and softmax
//! * [`utils`] - Image loading and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doodle_recognizer::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing();
//!
//! let config = DoodleConfig::default();
//! let classifier = load_classifier(&config.model)?;
//! let mut session = DoodleSession::from_config(&config, classifier)?;
//!
//! session.press(200.0, 400.0);
//! session.drag(600.0, 400.0);
//! session.release();
//!
//! let presentation = session.predict()?;
//! println!("{}", presentation);
//! # Ok(())
//! # }
//! ```

pub mod canvas;
pub mod core;
pub mod domain;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use doodle_recognizer::prelude::*;
/// ```
///
/// Included items cover the interactive flow: configuration, model loading,
/// the session and its results, plus the error types. Lower-level pieces
/// (preprocessor, individual networks, softmax) live in their own modules.
pub mod prelude {
    pub use crate::canvas::{CanvasConfig, PointerEvent, StrokeCanvas, load_events};
    pub use crate::core::{
        Classifier, ClassifierHandle, DoodleConfig, DoodleError, DoodleResult, init_tracing,
    };
    pub use crate::domain::{CategoryTable, Prediction};
    pub use crate::models::{ModelConfig, ModelVariant, load_classifier};
    pub use crate::pipeline::{
        DoodlePipeline, DoodleSession, PipelineState, Presentation, PredictionPresenter,
    };
    pub use crate::utils::load_image;
}
