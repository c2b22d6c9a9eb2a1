// simple-image/src/core/mod.rs
mod frame;
mod handle;

pub use frame::Frame;
pub use handle::{CropOptions, ImageHandle};

use image::imageops::FilterType;
use image::ImageFormat;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_QUALITY: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeAlgorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl ResizeAlgorithm {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResizeAlgorithm::Nearest => FilterType::Nearest,
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Container format tag carried by every [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

impl Format {
    /// Upper-case tag, e.g. `"JPEG"`.
    pub fn name(self) -> &'static str {
        match self {
            Format::Png => "PNG",
            Format::Jpeg => "JPEG",
            Format::Gif => "GIF",
            Format::Bmp => "BMP",
            Format::Tiff => "TIFF",
            Format::WebP => "WEBP",
        }
    }

    /// Canonical file extension: the lower-cased name, except JPEG which is `jpg`.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Jpeg => "jpg",
            Format::Gif => "gif",
            Format::Bmp => "bmp",
            Format::Tiff => "tiff",
            Format::WebP => "webp",
        }
    }

    pub fn content_type(self) -> String {
        format!("image/{}", self.name().to_lowercase())
    }

    pub fn is_lossy(self) -> bool {
        matches!(self, Format::Jpeg)
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Format::Png => ImageFormat::Png,
            Format::Jpeg => ImageFormat::Jpeg,
            Format::Gif => ImageFormat::Gif,
            Format::Bmp => ImageFormat::Bmp,
            Format::Tiff => ImageFormat::Tiff,
            Format::WebP => ImageFormat::WebP,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Format::Png),
            ImageFormat::Jpeg => Some(Format::Jpeg),
            ImageFormat::Gif => Some(Format::Gif),
            ImageFormat::Bmp => Some(Format::Bmp),
            ImageFormat::Tiff => Some(Format::Tiff),
            ImageFormat::WebP => Some(Format::WebP),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = SimpleImageError;

    /// Case-insensitive; `jpg` and `jpeg` are synonyms, as are `tif` and `tiff`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PNG" => Ok(Format::Png),
            "JPG" | "JPEG" => Ok(Format::Jpeg),
            "GIF" => Ok(Format::Gif),
            "BMP" => Ok(Format::Bmp),
            "TIF" | "TIFF" => Ok(Format::Tiff),
            "WEBP" => Ok(Format::WebP),
            _ => Err(SimpleImageError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Named reference point used instead of explicit coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    NorthWest,
    North,
    NorthEast,
    West,
    #[default]
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Gravity {
    /// Top-left offset of a `width` x `height` region placed inside a
    /// `canvas_width` x `canvas_height` canvas. Negative when the region is
    /// larger than the canvas.
    pub fn offset(self, canvas_width: u32, canvas_height: u32, width: u32, height: u32) -> (i64, i64) {
        let spare_x = i64::from(canvas_width) - i64::from(width);
        let spare_y = i64::from(canvas_height) - i64::from(height);

        let x = match self {
            Gravity::NorthWest | Gravity::West | Gravity::SouthWest => 0,
            Gravity::North | Gravity::Center | Gravity::South => spare_x / 2,
            Gravity::NorthEast | Gravity::East | Gravity::SouthEast => spare_x,
        };
        let y = match self {
            Gravity::NorthWest | Gravity::North | Gravity::NorthEast => 0,
            Gravity::West | Gravity::Center | Gravity::East => spare_y / 2,
            Gravity::SouthWest | Gravity::South | Gravity::SouthEast => spare_y,
        };
        (x, y)
    }
}

/// Lossy encode quality, always within 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Option<Self> {
        (1..=100).contains(&value).then_some(Self(value))
    }

    /// Accepts only an unsigned integer literal between 1 and 100.
    ///
    /// Signs, whitespace, fractions and exponents are all rejected; leading
    /// zeros are fine (`"050"` is 50).
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u32 = text.parse().ok()?;
        u8::try_from(value).ok().and_then(Self::new)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Anything accepted by [`ImageHandle::set_quality`].
///
/// Integers are taken at face value; strings must be an unsigned integer
/// literal. Floats always print with a fraction (`50.0`) and are rejected.
pub trait IntoQuality {
    fn into_quality(self) -> Result<Quality>;
}

fn invalid_quality(value: impl fmt::Display) -> SimpleImageError {
    SimpleImageError::InvalidParameter(format!("Invalid quality: '{}'", value))
}

macro_rules! integer_quality {
    ($($t:ty),*) => {$(
        impl IntoQuality for $t {
            fn into_quality(self) -> Result<Quality> {
                u8::try_from(self)
                    .ok()
                    .and_then(Quality::new)
                    .ok_or_else(|| invalid_quality(self))
            }
        }
    )*};
}

integer_quality!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

macro_rules! float_quality {
    ($($t:ty),*) => {$(
        impl IntoQuality for $t {
            fn into_quality(self) -> Result<Quality> {
                format!("{:?}", self).into_quality()
            }
        }
    )*};
}

float_quality!(f32, f64);

impl IntoQuality for &str {
    fn into_quality(self) -> Result<Quality> {
        Quality::parse(self).ok_or_else(|| invalid_quality(self))
    }
}

impl IntoQuality for String {
    fn into_quality(self) -> Result<Quality> {
        self.as_str().into_quality()
    }
}

impl IntoQuality for Quality {
    fn into_quality(self) -> Result<Quality> {
        Ok(self)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(DEFAULT_QUALITY)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub quality: u8,
    pub algorithm: ResizeAlgorithm,
    pub max_dimensions: Option<(u32, u32)>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            algorithm: ResizeAlgorithm::Lanczos3,
            max_dimensions: Some((100_000, 100_000)),
        }
    }
}

impl ImageConfig {
    pub fn validate(&self) -> Result<()> {
        if Quality::new(self.quality).is_none() {
            return Err(SimpleImageError::InvalidParameter(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        if let Some((w, h)) = self.max_dimensions {
            if w == 0 || h == 0 {
                return Err(SimpleImageError::InvalidParameter(
                    "Maximum dimensions must be non-zero".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub(crate) fn initial_quality(&self) -> Quality {
        Quality::new(self.quality).unwrap_or_default()
    }
}

#[derive(Error, Debug)]
pub enum SimpleImageError {
    #[error("File Not Found: '{}'", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),

    #[error("Memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),
}

pub type Result<T> = std::result::Result<T, SimpleImageError>;
