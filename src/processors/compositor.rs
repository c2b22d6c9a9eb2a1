// simple-image/src/processors/compositor.rs
use crate::core::{Frame, Gravity};
use image::{imageops, DynamicImage};

/// Source-over compositing of one frame onto another.
///
/// The destination keeps its format tag and properties. It stays RGBA when
/// it had an alpha channel and is flattened back to RGB otherwise.
#[derive(Clone, Default)]
pub struct Compositor;

impl Compositor {
    pub fn new() -> Self {
        Self
    }

    pub fn composite_at(&self, destination: &Frame, source: &Frame, x: i64, y: i64) -> Frame {
        log::debug!(
            "Compositing {}x{} over {}x{} at ({}, {})",
            source.columns(),
            source.rows(),
            destination.columns(),
            destination.rows(),
            x,
            y
        );

        let mut canvas = destination.pixels().to_rgba8();
        let overlay = source.pixels().to_rgba8();
        imageops::overlay(&mut canvas, &overlay, x, y);

        let pixels = if destination.pixels().color().has_alpha() {
            DynamicImage::ImageRgba8(canvas)
        } else {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
        };
        destination.with_pixels(pixels)
    }

    pub fn composite_anchored(&self, destination: &Frame, source: &Frame, gravity: Gravity) -> Frame {
        let (x, y) = gravity.offset(
            destination.columns(),
            destination.rows(),
            source.columns(),
            source.rows(),
        );
        self.composite_at(destination, source, x, y)
    }
}
