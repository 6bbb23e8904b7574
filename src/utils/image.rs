//! Image loading helpers.

use crate::core::constants::DEFAULT_PARALLEL_THRESHOLD;
use crate::core::errors::DoodleError;
use image::RgbImage;
use std::path::Path;

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns `DoodleError::ImageLoad` if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<RgbImage, DoodleError> {
    let img = image::open(path).map_err(|source| DoodleError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Loads a batch of images from file paths.
///
/// Uses parallel loading when the number of images exceeds the default
/// parallel threshold.
pub fn load_images_batch<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
) -> Result<Vec<RgbImage>, DoodleError> {
    load_images_batch_with_threshold(paths, None)
}

/// Loads a batch of images with a custom parallel threshold.
///
/// # Arguments
///
/// * `paths` - Paths to the image files to load
/// * `parallel_threshold` - Number of images above which loading runs on the
///   rayon pool. `None` uses `DEFAULT_PARALLEL_THRESHOLD`.
///
/// # Errors
///
/// Returns the first load error encountered; images keep their input order.
pub fn load_images_batch_with_threshold<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
    parallel_threshold: Option<usize>,
) -> Result<Vec<RgbImage>, DoodleError> {
    let threshold = parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD);

    if paths.len() > threshold {
        use rayon::prelude::*;
        paths.par_iter().map(|p| load_image(p.as_ref())).collect()
    } else {
        paths.iter().map(|p| load_image(p.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_load_batch_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (0..6u8)
            .map(|i| {
                let path = dir.path().join(format!("img_{i}.png"));
                RgbImage::from_pixel(4, 4, Rgb([i * 10, 0, 0]))
                    .save(&path)
                    .unwrap();
                path
            })
            .collect();

        let sequential = load_images_batch_with_threshold(&paths, Some(100)).unwrap();
        let parallel = load_images_batch_with_threshold(&paths, Some(0)).unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(parallel[5].get_pixel(0, 0)[0], 50);
    }

    #[test]
    fn test_load_missing_image() {
        let err = load_image(Path::new("missing/doodle.jpg")).unwrap_err();
        assert!(matches!(err, DoodleError::ImageLoad { .. }));
    }
}
