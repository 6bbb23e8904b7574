//! Intensity normalization for single-channel model inputs.

use crate::core::errors::{DoodleError, DoodleResult};
use image::GrayImage;

/// Maps 8-bit intensities to model input values.
///
/// Each value becomes `pixel * alpha + beta`, where `alpha = scale / std` and
/// `beta = -mean / std`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeGray {
    /// Scaling factor (scale / std).
    pub alpha: f32,
    /// Offset (-mean / std).
    pub beta: f32,
}

impl NormalizeGray {
    /// Creates a normalizer.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional mean subtracted after scaling (defaults to 0.0)
    /// * `std` - Optional standard deviation divided by (defaults to 1.0)
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the scale or std is not a finite
    /// positive number, or the mean is not finite.
    pub fn new(scale: Option<f32>, mean: Option<f32>, std: Option<f32>) -> DoodleResult<Self> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or(0.0);
        let std = std.unwrap_or(1.0);

        if !scale.is_finite() || scale <= 0.0 {
            return Err(DoodleError::config_error(format!(
                "Scale must be a finite value greater than 0, got {scale}"
            )));
        }
        if !mean.is_finite() {
            return Err(DoodleError::config_error(format!(
                "Mean must be finite, got {mean}"
            )));
        }
        if !std.is_finite() || std <= 0.0 {
            return Err(DoodleError::config_error(format!(
                "Standard deviation must be a finite value greater than 0, got {std}"
            )));
        }

        Ok(Self {
            alpha: scale / std,
            beta: -mean / std,
        })
    }

    /// Normalizes a single intensity.
    #[inline]
    pub fn apply_value(&self, pixel: u8) -> f32 {
        pixel as f32 * self.alpha + self.beta
    }

    /// Normalizes every pixel, flattening in row-major order.
    pub fn apply(&self, image: &GrayImage) -> Vec<f32> {
        image
            .as_raw()
            .iter()
            .map(|&p| self.apply_value(p))
            .collect()
    }

    /// The values produced for intensity 0 and intensity 255, as `(min, max)`.
    pub fn output_range(&self) -> (f32, f32) {
        let low = self.apply_value(0);
        let high = self.apply_value(u8::MAX);
        (low.min(high), low.max(high))
    }
}

impl Default for NormalizeGray {
    fn default() -> Self {
        Self {
            alpha: 1.0 / 255.0,
            beta: 0.0,
        }
    }
}
