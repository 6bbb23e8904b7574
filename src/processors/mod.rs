//! Image and score processing.
//!
//! - [`preprocess`]: raster to tensor conversion
//! - [`normalization`]: intensity scaling and standardization
//! - [`softmax`]: scores to probabilities, argmax and top-k

pub mod normalization;
pub mod preprocess;
pub mod softmax;

pub use normalization::NormalizeGray;
pub use preprocess::{PreprocessConfig, Preprocessor};
pub use softmax::{ScoreError, argmax, softmax, top_k};

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Resampling filter used when shrinking the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    /// Nearest neighbor.
    Nearest,
    /// Linear (bilinear) filter.
    Triangle,
    /// Cubic filter, equivalent to PIL's bicubic resampling.
    CatmullRom,
    /// Gaussian filter.
    Gaussian,
    /// Lanczos with window 3.
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_names() {
        let filter: ResizeFilter = serde_json::from_str(r#""catmull_rom""#).unwrap();
        assert_eq!(filter, ResizeFilter::CatmullRom);
        assert_eq!(FilterType::from(filter), FilterType::CatmullRom);
    }
}
