//! Raster to tensor conversion.
//!
//! The reference method, used unless configured otherwise:
//!
//! 1. RGB to luma with the `image` crate's Rec. 709 weights
//! 2. resize the whole canvas to 28x28 with the Catmull-Rom (bicubic) filter
//! 3. flatten row-major and scale by 1/255 into `[0, 1]`
//!
//! Inversion and cropping to the drawn content are opt-in.

use super::normalization::NormalizeGray;
use super::ResizeFilter;
use crate::core::batch::Tensor1D;
use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::MODEL_INPUT_SIDE;
use crate::core::errors::{DoodleError, DoodleResult, ProcessingStage, SimpleError};
use crate::core::validation::{validate_finite, validate_positive, validate_range};
use image::{GrayImage, Luma, RgbImage, imageops};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Side length of the square output.
    pub input_side: u32,
    /// Resampling filter used to shrink the raster.
    pub resize_filter: ResizeFilter,
    /// Invert intensities (for dark strokes on a light background).
    pub invert: bool,
    /// Crop to the bounding box of the drawn content before resizing.
    pub crop_to_content: bool,
    /// Intensity above which a pixel counts as content when cropping.
    pub content_threshold: u8,
    /// Margin around the cropped content, as a fraction of its longer side.
    pub content_margin: f32,
    /// Scaling factor applied to 8-bit intensities.
    pub normalize_scale: f32,
    /// Mean subtracted after scaling.
    pub normalize_mean: f32,
    /// Standard deviation divided by after mean subtraction.
    pub normalize_std: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            input_side: MODEL_INPUT_SIDE,
            resize_filter: ResizeFilter::CatmullRom,
            invert: false,
            crop_to_content: false,
            content_threshold: 32,
            content_margin: 0.1,
            normalize_scale: 1.0 / 255.0,
            normalize_mean: 0.0,
            normalize_std: 1.0,
        }
    }
}

impl ConfigValidator for PreprocessConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_positive(self.input_side, "preprocess.input_side")?;
        validate_finite(self.content_margin, "preprocess.content_margin")?;
        validate_range(self.content_margin, 0.0, 1.0, "preprocess.content_margin")?;
        validate_finite(self.normalize_scale, "preprocess.normalize_scale")?;
        validate_positive(self.normalize_scale, "preprocess.normalize_scale")?;
        validate_finite(self.normalize_mean, "preprocess.normalize_mean")?;
        validate_finite(self.normalize_std, "preprocess.normalize_std")?;
        validate_positive(self.normalize_std, "preprocess.normalize_std")?;
        Ok(())
    }
}

/// Converts canvas rasters into model input tensors.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessConfig,
    normalizer: NormalizeGray,
}

impl Preprocessor {
    /// Creates a preprocessor after validating its configuration.
    pub fn new(config: PreprocessConfig) -> DoodleResult<Self> {
        config.validate()?;
        let normalizer = NormalizeGray::new(
            Some(config.normalize_scale),
            Some(config.normalize_mean),
            Some(config.normalize_std),
        )?;
        Ok(Self { config, normalizer })
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Number of values in every produced tensor.
    pub fn output_len(&self) -> usize {
        (self.config.input_side * self.config.input_side) as usize
    }

    /// Inclusive range every produced value falls in.
    pub fn output_range(&self) -> (f32, f32) {
        self.normalizer.output_range()
    }

    /// Converts a raster into a flat, normalized tensor.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` if the raster has a zero dimension
    /// * `Processing` if the normalization constants overflow `f32` and
    ///   produce non-finite values
    pub fn process(&self, image: &RgbImage) -> DoodleResult<Tensor1D> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DoodleError::invalid_input(format!(
                "cannot preprocess a {}x{} raster",
                width, height
            )));
        }

        let mut gray = imageops::grayscale(image);
        if self.config.invert {
            imageops::invert(&mut gray);
        }
        if self.config.crop_to_content {
            if let Some(cropped) = self.crop_to_content(&gray) {
                gray = cropped;
            }
        }

        let side = self.config.input_side;
        let resized = imageops::resize(&gray, side, side, self.config.resize_filter.into());
        let values = self.normalizer.apply(&resized);
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(DoodleError::processing(
                ProcessingStage::Normalization,
                format!(
                    "normalized value {} is not finite (alpha {}, beta {})",
                    bad, self.normalizer.alpha, self.normalizer.beta
                ),
                SimpleError::new("normalization constants overflow f32"),
            ));
        }
        tracing::debug!(
            "Preprocessed {}x{} raster into {} values",
            width,
            height,
            values.len()
        );
        Ok(Tensor1D::from_vec(values))
    }

    /// Loads a saved snapshot and converts it.
    ///
    /// # Errors
    ///
    /// Returns `ImageLoad` if the file cannot be opened or decoded.
    pub fn process_path(&self, path: impl AsRef<Path>) -> DoodleResult<Tensor1D> {
        let image = crate::utils::load_image(path.as_ref())?;
        self.process(&image)
    }

    /// Square crop around pixels brighter than the content threshold, padded
    /// with background. Returns `None` when nothing is drawn.
    fn crop_to_content(&self, gray: &GrayImage) -> Option<GrayImage> {
        let threshold = self.config.content_threshold;
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in gray.enumerate_pixels() {
            if pixel[0] <= threshold {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        let (x0, y0, x1, y1) = bounds?;

        let content_w = x1 - x0 + 1;
        let content_h = y1 - y0 + 1;
        let longest = content_w.max(content_h) as f32;
        let side = (longest * (1.0 + 2.0 * self.config.content_margin)).ceil() as u32;
        let side = side.max(1);

        let content = imageops::crop_imm(gray, x0, y0, content_w, content_h).to_image();
        let mut square = GrayImage::from_pixel(side, side, Luma([0]));
        let offset_x = (side - content_w) / 2;
        let offset_y = (side - content_h) / 2;
        imageops::overlay(&mut square, &content, offset_x as i64, offset_y as i64);
        Some(square)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            config: PreprocessConfig::default(),
            normalizer: NormalizeGray::default(),
        }
    }
}
