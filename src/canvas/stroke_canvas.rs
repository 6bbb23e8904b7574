//! Persistent RGB raster that accumulates pointer strokes.

use super::{CanvasConfig, CanvasPoint};
use crate::core::errors::{DoodleError, DoodleResult};
use image::{Pixel, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;
use std::path::Path;

/// In-memory drawing surface mirroring the on-screen canvas.
///
/// Segments are rasterized as soon as they are drawn; no stroke history is
/// kept. The raster is only handed out as an owned copy or a shared borrow.
#[derive(Debug, Clone)]
pub struct StrokeCanvas {
    image: RgbImage,
    last_point: Option<CanvasPoint>,
    stroke_color: Rgb<u8>,
    background: Rgb<u8>,
    line_width: u32,
}

impl StrokeCanvas {
    /// Creates a background-only canvas.
    pub fn new(config: &CanvasConfig) -> Self {
        let background = Rgb(config.background_color);
        Self {
            image: RgbImage::from_pixel(config.width, config.height, background),
            last_point: None,
            stroke_color: Rgb(config.stroke_color),
            background,
            line_width: config.line_width,
        }
    }

    /// Records the start of a stroke. Nothing is drawn.
    ///
    /// A non-finite position is ignored.
    pub fn begin_stroke(&mut self, x: f32, y: f32) {
        if let Some(point) = self.clip(x, y) {
            self.last_point = Some(point);
        }
    }

    /// Draws a segment from the previous point to `(x, y)` and moves the
    /// stroke head there.
    ///
    /// Does nothing when no stroke has been started, so motion events that
    /// arrive before a press are ignored. Non-finite positions are dropped and
    /// the stroke head stays where it was.
    pub fn extend_stroke(&mut self, x: f32, y: f32) {
        let Some(from) = self.last_point else {
            return;
        };
        let Some(to) = self.clip(x, y) else {
            return;
        };
        self.draw_segment(from, to);
        self.last_point = Some(to);
    }

    /// Ends the current stroke; later motion is ignored until the next press.
    pub fn end_stroke(&mut self) {
        self.last_point = None;
    }

    /// Whether a stroke is in progress.
    pub fn is_stroking(&self) -> bool {
        self.last_point.is_some()
    }

    /// Replaces the raster with a blank one and drops any in-progress stroke.
    pub fn clear(&mut self) {
        self.image = RgbImage::from_pixel(self.image.width(), self.image.height(), self.background);
        self.last_point = None;
    }

    /// Changes the color used for subsequent segments.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the color has the same intensity as the background,
    /// which would make strokes vanish once the raster is reduced to luma.
    pub fn set_stroke_color(&mut self, color: [u8; 3]) -> DoodleResult<()> {
        let color = Rgb(color);
        if color.to_luma() == self.background.to_luma() {
            return Err(DoodleError::invalid_input(format!(
                "stroke color {:?} has the same intensity as the background {:?}",
                color.0, self.background.0
            )));
        }
        self.stroke_color = color;
        Ok(())
    }

    pub fn stroke_color(&self) -> [u8; 3] {
        self.stroke_color.0
    }

    pub fn line_width(&self) -> u32 {
        self.line_width
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Owned copy of the current raster.
    pub fn snapshot(&self) -> RgbImage {
        self.image.clone()
    }

    /// Read-only view of the current raster.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Returns true if no pixel differs from the background.
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| *p == self.background)
    }

    /// Writes the raster to `path`, overwriting any existing file.
    ///
    /// The format follows the file extension (JPEG for `.jpg`).
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> DoodleResult<()> {
        let path = path.as_ref();
        self.image
            .save(path)
            .map_err(|source| DoodleError::ImageSave {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!("Saved canvas snapshot to {}", path.display());
        Ok(())
    }

    /// Clamps a pointer position to the raster plus one line width on every
    /// side, so pixel arithmetic in the rasterizer stays far from `i32` limits.
    fn clip(&self, x: f32, y: f32) -> Option<CanvasPoint> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let margin = self.line_width as f32;
        let (width, height) = self.image.dimensions();
        Some(CanvasPoint::new(
            x.clamp(-margin, width as f32 + margin),
            y.clamp(-margin, height as f32 + margin),
        ))
    }

    /// Rasterizes one thick segment with round caps: a disc at each end joined
    /// by a quad of the line width.
    fn draw_segment(&mut self, from: CanvasPoint, to: CanvasPoint) {
        let color = self.stroke_color;
        let half_width = self.line_width as f32 / 2.0;
        let radius = half_width.round() as i32;

        draw_filled_circle_mut(&mut self.image, from.to_pixel(), radius, color);
        draw_filled_circle_mut(&mut self.image, to.to_pixel(), radius, color);

        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let length = dx.hypot(dy);
        if length <= f32::EPSILON {
            return;
        }

        let nx = -dy / length * half_width;
        let ny = dx / length * half_width;
        let corners = [
            offset(from, nx, ny),
            offset(to, nx, ny),
            offset(to, -nx, -ny),
            offset(from, -nx, -ny),
        ];
        // imageproc rejects polygons whose first and last vertices coincide
        if corners[0] != corners[3] {
            draw_polygon_mut(&mut self.image, &corners, color);
        }
    }
}

impl Default for StrokeCanvas {
    fn default() -> Self {
        Self::new(&CanvasConfig::default())
    }
}

fn offset(p: CanvasPoint, dx: f32, dy: f32) -> Point<i32> {
    Point::new((p.x + dx).round() as i32, (p.y + dy).round() as i32)
}
