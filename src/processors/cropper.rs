// simple-image/src/processors/cropper.rs
use crate::core::{Frame, Gravity, Result, SimpleImageError};

/// Destructive crops: the result's canvas is exactly the cropped region.
///
/// Regions hanging off the canvas are clipped to it; a region with nothing
/// left after clipping is an error.
#[derive(Clone, Default)]
pub struct Cropper;

impl Cropper {
    pub fn new() -> Self {
        Self
    }

    pub fn crop(&self, frame: &Frame, x: u32, y: u32, width: u32, height: u32) -> Result<Frame> {
        let (columns, rows) = (frame.columns(), frame.rows());
        let width = width.min(columns.saturating_sub(x));
        let height = height.min(rows.saturating_sub(y));

        if width == 0 || height == 0 {
            return Err(SimpleImageError::InvalidParameter(format!(
                "Crop region at ({}, {}) lies outside the {}x{} image",
                x, y, columns, rows
            )));
        }

        log::debug!(
            "Cropping {}x{} image to {}x{} at ({}, {})",
            columns,
            rows,
            width,
            height,
            x,
            y
        );

        let pixels = frame.pixels().crop_imm(x, y, width, height);
        Ok(frame.with_pixels(pixels))
    }

    pub fn crop_anchored(&self, frame: &Frame, gravity: Gravity, width: u32, height: u32) -> Result<Frame> {
        let (columns, rows) = (frame.columns(), frame.rows());
        let (x, y) = gravity.offset(columns, rows, width, height);

        // oversize regions pin to the canvas edge
        let x = u32::try_from(x.max(0)).unwrap_or(0);
        let y = u32::try_from(y.max(0)).unwrap_or(0);
        self.crop(frame, x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Format;
    use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> Frame {
        let pixels = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]));
        Frame::new(DynamicImage::ImageRgb8(pixels), Format::Png)
    }

    #[test]
    fn crop_takes_the_requested_region() {
        let cropped = Cropper::new().crop(&gradient(100, 80), 10, 20, 30, 40).unwrap();
        assert_eq!((cropped.columns(), cropped.rows()), (30, 40));
        assert_eq!(cropped.pixels().get_pixel(0, 0).0[..2], [10, 20]);
    }

    #[test]
    fn crop_clips_to_canvas() {
        let cropped = Cropper::new().crop(&gradient(100, 80), 90, 70, 50, 50).unwrap();
        assert_eq!((cropped.columns(), cropped.rows()), (10, 10));
    }

    #[test]
    fn crop_outside_canvas_is_an_error() {
        assert!(Cropper::new().crop(&gradient(100, 80), 100, 0, 10, 10).is_err());
        assert!(Cropper::new().crop(&gradient(100, 80), 0, 0, 0, 10).is_err());
    }

    #[test]
    fn center_crop_is_centered() {
        let cropped = Cropper::new()
            .crop_anchored(&gradient(100, 100), Gravity::Center, 50, 50)
            .unwrap();
        assert_eq!((cropped.columns(), cropped.rows()), (50, 50));
        assert_eq!(cropped.pixels().get_pixel(0, 0).0[..2], [25, 25]);
    }

    #[test]
    fn oversize_anchored_crop_keeps_whole_axis() {
        let cropped = Cropper::new()
            .crop_anchored(&gradient(100, 60), Gravity::Center, 40, 200)
            .unwrap();
        assert_eq!((cropped.columns(), cropped.rows()), (40, 60));
        assert_eq!(cropped.pixels().get_pixel(0, 0).0[..2], [30, 0]);
    }

    #[test]
    fn south_east_crop() {
        let cropped = Cropper::new()
            .crop_anchored(&gradient(100, 60), Gravity::SouthEast, 10, 10)
            .unwrap();
        assert_eq!(cropped.pixels().get_pixel(0, 0).0[..2], [90, 50]);
    }
}
