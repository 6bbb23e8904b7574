//! Tensor type aliases used between the preprocessor and the classifiers.

use ndarray::{Array1, ArrayD};

/// Flat single-sample tensor, the output of the preprocessor.
pub type Tensor1D = Array1<f32>;

/// Tensor with a shape only known at runtime, used to feed exported models.
pub type TensorD = ArrayD<f32>;
