// simple-image/src/processors/resizer.rs
use crate::core::{Frame, ResizeAlgorithm, Result, SimpleImageError};
use std::fmt;
use std::str::FromStr;

/// A requested edge length: absolute pixels or a percentage of the current edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Pixels(u32),
    Percent(u32),
}

impl Dimension {
    /// Resolves against the current edge length. Percentages above 100 are
    /// clamped to 100; the result is not rounded.
    pub fn resolve(self, current: u32) -> f64 {
        match self {
            Dimension::Pixels(pixels) => f64::from(pixels),
            Dimension::Percent(percent) => {
                f64::from(current) * (f64::from(percent.min(100)) / 100.0)
            }
        }
    }
}

impl FromStr for Dimension {
    type Err = SimpleImageError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SimpleImageError::InvalidParameter(format!("Invalid dimension: '{}'", s));
        let is_digits = |t: &str| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit());

        if let Some(number) = s.strip_suffix('%') {
            if !is_digits(number) {
                return Err(invalid());
            }
            // huge percentages clamp to 100 anyway
            return Ok(Dimension::Percent(number.parse().unwrap_or(u32::MAX)));
        }

        if !is_digits(s) {
            return Err(invalid());
        }
        s.parse().map(Dimension::Pixels).map_err(|_| invalid())
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Pixels(pixels) => write!(f, "{}", pixels),
            Dimension::Percent(percent) => write!(f, "{}%", percent),
        }
    }
}

/// Anything accepted where a width or height is expected.
pub trait IntoDimension {
    fn into_dimension(self) -> Result<Dimension>;
}

impl IntoDimension for Dimension {
    fn into_dimension(self) -> Result<Dimension> {
        Ok(self)
    }
}

impl IntoDimension for u32 {
    fn into_dimension(self) -> Result<Dimension> {
        Ok(Dimension::Pixels(self))
    }
}

impl IntoDimension for i32 {
    fn into_dimension(self) -> Result<Dimension> {
        u32::try_from(self).map(Dimension::Pixels).map_err(|_| {
            SimpleImageError::InvalidParameter(format!("Negative dimension: {}", self))
        })
    }
}

impl IntoDimension for &str {
    fn into_dimension(self) -> Result<Dimension> {
        self.parse()
    }
}

impl IntoDimension for String {
    fn into_dimension(self) -> Result<Dimension> {
        self.parse()
    }
}

#[derive(Clone)]
pub struct Resizer {
    algorithm: ResizeAlgorithm,
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Resizes to exactly `width` x `height`; fractional sizes are truncated.
    pub fn resize_exact(&self, frame: &Frame, width: f64, height: f64) -> Result<Frame> {
        let (width, height) = (truncate(width), truncate(height));
        ensure_non_empty(width, height)?;

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            frame.columns(),
            frame.rows(),
            width,
            height
        );

        let pixels = frame
            .pixels()
            .resize_exact(width, height, self.algorithm.filter_type());
        Ok(frame.with_pixels(pixels))
    }

    /// Scales to the largest size fitting within `width` x `height`,
    /// preserving aspect ratio. Scales up as well as down.
    pub fn resize_to_fit(&self, frame: &Frame, width: u32, height: u32) -> Result<Frame> {
        ensure_non_empty(width, height)?;

        let pixels = frame
            .pixels()
            .resize(width, height, self.algorithm.filter_type());

        log::debug!(
            "Fitting image {}x{} into {}x{}: {}x{}",
            frame.columns(),
            frame.rows(),
            width,
            height,
            pixels.width(),
            pixels.height()
        );

        Ok(frame.with_pixels(pixels))
    }
}

fn truncate(value: f64) -> u32 {
    // `as` saturates: NaN and negatives become 0
    value.trunc() as u32
}

fn ensure_non_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SimpleImageError::InvalidParameter(format!(
            "Cannot resize to {}x{}",
            width, height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Format;
    use image::DynamicImage;

    fn frame(width: u32, height: u32) -> Frame {
        Frame::new(DynamicImage::new_rgb8(width, height), Format::Png)
    }

    #[test]
    fn parses_pixels_and_percentages() {
        assert_eq!("50%".parse::<Dimension>().unwrap(), Dimension::Percent(50));
        assert_eq!("120".parse::<Dimension>().unwrap(), Dimension::Pixels(120));
        assert_eq!("0%".parse::<Dimension>().unwrap(), Dimension::Percent(0));

        for bad in ["", "%", "-5", "5.5%", "50 %", "abc", "12px"] {
            assert!(bad.parse::<Dimension>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn percentages_clamp_at_one_hundred() {
        assert_eq!(Dimension::Percent(50).resolve(200), 100.0);
        assert_eq!(Dimension::Percent(250).resolve(200), 200.0);
        assert_eq!(Dimension::Percent(33).resolve(10).trunc(), 3.0);
        assert_eq!(Dimension::Pixels(42).resolve(200), 42.0);
    }

    #[test]
    fn negative_integers_are_rejected() {
        assert!((-1i32).into_dimension().is_err());
        assert_eq!(7i32.into_dimension().unwrap(), Dimension::Pixels(7));
    }

    #[test]
    fn resize_exact_truncates() {
        let resizer = Resizer::new(ResizeAlgorithm::Nearest);
        let resized = resizer.resize_exact(&frame(10, 10), 3.3, 7.99).unwrap();
        assert_eq!((resized.columns(), resized.rows()), (3, 7));
    }

    #[test]
    fn zero_size_is_an_error() {
        let resizer = Resizer::new(ResizeAlgorithm::Bilinear);
        assert!(resizer.resize_exact(&frame(10, 10), 0.4, 5.0).is_err());
        assert!(resizer.resize_to_fit(&frame(10, 10), 5, 0).is_err());
    }

    #[test]
    fn resize_to_fit_preserves_aspect_ratio() {
        let resizer = Resizer::new(ResizeAlgorithm::Lanczos3);

        let fitted = resizer.resize_to_fit(&frame(200, 100), 50, 50).unwrap();
        assert_eq!((fitted.columns(), fitted.rows()), (50, 25));

        let fitted = resizer.resize_to_fit(&frame(100, 200), 80, 80).unwrap();
        assert_eq!((fitted.columns(), fitted.rows()), (40, 80));
    }
}
