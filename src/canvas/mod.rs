//! Stroke capture.
//!
//! [`StrokeCanvas`] turns pointer drags into a persistent raster. Pointer input
//! from a host UI (or a recorded event file) is described by [`PointerEvent`].

mod events;
mod stroke_canvas;

pub use events::{PointerEvent, load_events};
pub use stroke_canvas::StrokeCanvas;

use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::{
    BACKGROUND_COLOR, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_LINE_WIDTH,
    DEFAULT_STROKE_COLOR,
};
use crate::core::validation::validate_positive;
use image::{Pixel, Rgb};
use serde::{Deserialize, Serialize};

/// A pointer position in canvas pixel space, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Nearest pixel coordinate.
    pub fn to_pixel(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// Drawing surface settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Stroke width in pixels.
    pub line_width: u32,
    /// Stroke color (RGB).
    pub stroke_color: [u8; 3],
    /// Background color (RGB).
    pub background_color: [u8; 3],
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            line_width: DEFAULT_LINE_WIDTH,
            stroke_color: DEFAULT_STROKE_COLOR,
            background_color: BACKGROUND_COLOR,
        }
    }
}

impl ConfigValidator for CanvasConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_positive(self.width, "canvas.width")?;
        validate_positive(self.height, "canvas.height")?;
        validate_positive(self.line_width, "canvas.line_width")?;

        // strokes must stay visible once the raster is reduced to one channel
        let stroke_luma = Rgb(self.stroke_color).to_luma()[0];
        let background_luma = Rgb(self.background_color).to_luma()[0];
        if stroke_luma == background_luma {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "stroke color {:?} and background color {:?} have the same intensity ({})",
                    self.stroke_color, self.background_color, stroke_luma
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_canvas_config() {
        let config = CanvasConfig::default();
        assert_eq!((config.width, config.height), (800, 800));
        assert_eq!(config.line_width, 35);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_low_contrast_rejected() {
        let config = CanvasConfig {
            stroke_color: [0, 0, 0],
            ..CanvasConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = CanvasConfig {
            width: 0,
            ..CanvasConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_point_rounding() {
        assert_eq!(CanvasPoint::new(10.4, 10.6).to_pixel(), (10, 11));
    }
}
