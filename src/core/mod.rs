//! The core module of the doodle pipeline.
//!
//! This module contains the pieces every other module builds on:
//! - Configuration loading and validation
//! - Constants used throughout the pipeline
//! - Error handling
//! - The [`Classifier`] trait and tensor aliases
//! - Parameter validation helpers

pub mod batch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod traits;
pub mod validation;

pub use batch::{Tensor1D, TensorD};
pub use config::{ConfigError, ConfigValidator, DoodleConfig};
pub use constants::*;
pub use errors::{DoodleError, DoodleResult, ProcessingStage};
pub use traits::{Classifier, ClassifierHandle};

pub use crate::utils::init_tracing;
