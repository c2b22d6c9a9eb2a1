// simple-image/src/core/handle.rs
use super::{Format, Frame, Gravity, ImageConfig, IntoQuality, Quality, Result};
use crate::processors::{
    Compositor, Compressor, Cropper, IntoDimension, Loader, MetadataProcessor, Resizer,
};
use crate::utils::{file_name, staging_path};
use std::fmt;
use std::path::{Path, PathBuf};

/// Optional crop rectangle. Missing fields default to `x = 0`, `y = 0` and
/// the current width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropOptions {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl CropOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: u32, y: u32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// An image being edited: one decoded frame, an optional destination path
/// and the JPEG quality used whenever the frame is encoded as JPEG.
///
/// Every transform replaces the owned frame wholesale. A handle is meant to
/// be driven from one place at a time; separate handles share nothing.
///
/// ```no_run
/// use simple_image::ImageHandle;
///
/// let mut image = ImageHandle::from_file("sample.png")?;
/// image.resize("50%", "50%")?;
/// image.to_jpg()?;
/// image.set_quality(60);
/// image.set_path("sample.jpg");
/// assert!(image.save());
/// # Ok::<(), simple_image::SimpleImageError>(())
/// ```
pub struct ImageHandle {
    frame: Frame,
    path: Option<PathBuf>,
    quality: Quality,
    loader: Loader,
    resizer: Resizer,
    cropper: Cropper,
    compositor: Compositor,
    compressor: Compressor,
    metadata: MetadataProcessor,
}

impl ImageHandle {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_config(path, ImageConfig::default())
    }

    /// Decodes the first frame of `path` and remembers `path` as the save
    /// destination. Fails with `FileNotFound` if there is no such file.
    pub fn from_file_with_config(path: impl AsRef<Path>, config: ImageConfig) -> Result<Self> {
        let path = path.as_ref();
        config.validate()?;

        let loader = Loader::new().with_max_dimensions(config.max_dimensions);
        let frame = loader.load(path)?;

        let mut image = Self::with_frame(frame, loader, &config);
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    pub fn from_blob(data: &[u8]) -> Result<Self> {
        Self::from_blob_with_config(data, ImageConfig::default())
    }

    /// Decodes the first frame of `data`. No path is set; assign one with
    /// [`set_path`](Self::set_path) before calling [`save`](Self::save).
    pub fn from_blob_with_config(data: &[u8], config: ImageConfig) -> Result<Self> {
        config.validate()?;

        let loader = Loader::new().with_max_dimensions(config.max_dimensions);
        let frame = loader.load_from_bytes(data)?;
        log::info!(
            "Loaded image from {} bytes ({}x{} {})",
            data.len(),
            frame.columns(),
            frame.rows(),
            frame.format()
        );

        Ok(Self::with_frame(frame, loader, &config))
    }

    fn with_frame(frame: Frame, loader: Loader, config: &ImageConfig) -> Self {
        Self {
            frame,
            path: None,
            quality: config.initial_quality(),
            loader,
            resizer: Resizer::new(config.algorithm),
            cropper: Cropper::new(),
            compositor: Compositor::new(),
            compressor: Compressor::new(),
            metadata: MetadataProcessor::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn format(&self) -> Format {
        self.frame.format()
    }

    pub fn width(&self) -> u32 {
        self.frame.columns()
    }

    pub fn height(&self) -> u32 {
        self.frame.rows()
    }

    /// The frame encoded in its current format.
    pub fn content(&self) -> Result<Vec<u8>> {
        self.compressor.compress_to_bytes(&self.frame, self.encode_quality())
    }

    pub fn content_type(&self) -> String {
        self.format().content_type()
    }

    /// Extension implied by the current format, regardless of `path`.
    pub fn ext(&self) -> &'static str {
        self.format().extension()
    }

    pub fn filename(&self) -> Option<String> {
        self.path.as_deref().and_then(file_name)
    }

    pub fn quality(&self) -> u8 {
        self.quality.value()
    }

    /// Sets the JPEG quality if `value` is an integer from 1 to 100 (or a
    /// string holding one). Anything else is ignored and the previous
    /// quality is kept.
    pub fn set_quality(&mut self, value: impl IntoQuality) {
        self.apply_quality(value);
    }

    fn apply_quality(&mut self, value: impl IntoQuality) -> bool {
        match value.into_quality() {
            Ok(quality) => {
                self.quality = quality;
                true
            }
            Err(e) => {
                log::warn!("{}, keeping quality {}", e, self.quality);
                false
            }
        }
    }

    pub fn comment(&self) -> Option<&str> {
        self.metadata.comment(&self.frame)
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.metadata.set_comment(&mut self.frame, comment);
    }

    pub fn to_png(&mut self) {
        self.retag(Format::Png);
    }

    pub fn to_gif(&mut self) {
        self.retag(Format::Gif);
    }

    /// Converts to JPEG, running the frame through the encoder at the
    /// current quality so the compression actually applies.
    pub fn to_jpeg(&mut self) -> Result<()> {
        if self.format() == Format::Jpeg {
            return Ok(());
        }
        self.frame = self.converted(self.frame.clone(), Format::Jpeg)?;
        Ok(())
    }

    pub fn to_jpg(&mut self) -> Result<()> {
        self.to_jpeg()
    }

    /// Converts to `target` (`png`, `jpg`/`jpeg` or `gif`, any case). Other
    /// targets are logged and ignored.
    pub fn change_format(&mut self, target: &str) -> Result<()> {
        match target.parse::<Format>() {
            Ok(Format::Png) => self.to_png(),
            Ok(Format::Jpeg) => return self.to_jpeg(),
            Ok(Format::Gif) => self.to_gif(),
            Ok(other) => log::warn!("Conversion to {} is not supported, keeping {}", other, self.format()),
            Err(_) => log::warn!("Unknown format '{}', keeping {}", target, self.format()),
        }
        Ok(())
    }

    fn retag(&mut self, format: Format) {
        if self.format() != format {
            log::debug!("Changing format {} -> {}", self.format(), format);
            self.frame.set_format(format);
        }
    }

    fn converted(&self, mut frame: Frame, target: Format) -> Result<Frame> {
        if frame.format() == target {
            return Ok(frame);
        }
        log::debug!("Converting {} -> {}", frame.format(), target);
        frame.set_format(target);
        if !target.is_lossy() {
            return Ok(frame);
        }

        // quality only takes effect when encoding
        let data = self.compressor.compress_to_bytes(&frame, Some(self.quality))?;
        self.loader.load_from_bytes(&data)
    }

    /// Resizes to `width` x `height`; each may be pixels or a percentage
    /// string such as `"50%"` of the current edge.
    pub fn resize<W: IntoDimension, H: IntoDimension>(&mut self, width: W, height: H) -> Result<()> {
        let width = width.into_dimension()?.resolve(self.width());
        let height = height.into_dimension()?.resolve(self.height());
        self.resize_pixels(width, height)
    }

    /// Resizes to `width`, deriving the height from the current aspect ratio.
    pub fn resize_by_width<W: IntoDimension>(&mut self, width: W) -> Result<()> {
        let (columns, rows) = (f64::from(self.width()), f64::from(self.height()));
        let width = width.into_dimension()?.resolve(self.width());
        self.resize_pixels(width, width * rows / columns)
    }

    /// Resizes to `height`, deriving the width from the current aspect ratio.
    pub fn resize_by_height<H: IntoDimension>(&mut self, height: H) -> Result<()> {
        let (columns, rows) = (f64::from(self.width()), f64::from(self.height()));
        let height = height.into_dimension()?.resolve(self.height());
        self.resize_pixels(height * columns / rows, height)
    }

    /// Scales to fit within `width` x `height`, preserving aspect ratio.
    pub fn resize_to_fit(&mut self, width: u32, height: u32) -> Result<()> {
        self.frame = self.resizer.resize_to_fit(&self.frame, width, height)?;
        Ok(())
    }

    fn resize_pixels(&mut self, width: f64, height: f64) -> Result<()> {
        self.frame = self.resizer.resize_exact(&self.frame, width, height)?;
        Ok(())
    }

    pub fn crop(&mut self, options: CropOptions) -> Result<()> {
        self.frame = self.cropper.crop(
            &self.frame,
            options.x.unwrap_or(0),
            options.y.unwrap_or(0),
            options.width.unwrap_or(self.width()),
            options.height.unwrap_or(self.height()),
        )?;
        Ok(())
    }

    pub fn crop_center(&mut self, width: u32, height: u32) -> Result<()> {
        self.frame = self
            .cropper
            .crop_anchored(&self.frame, Gravity::Center, width, height)?;
        Ok(())
    }

    /// Overlays the image at `path` with its top-left corner at (`x`, `y`).
    ///
    /// Failures (missing or undecodable source included) are logged and the
    /// image is left exactly as it was.
    pub fn composite(&mut self, path: impl AsRef<Path>, x: i64, y: i64) {
        let path = path.as_ref();
        match self.load_overlay(path) {
            Ok(source) => self.frame = self.compositor.composite_at(&self.frame, &source, x, y),
            Err(e) => log::warn!("Skipping composite of {}: {}", path.display(), e),
        }
    }

    /// Like [`composite`](Self::composite) with the source centred.
    pub fn composite_center(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match self.load_overlay(path) {
            Ok(source) => {
                self.frame = self
                    .compositor
                    .composite_anchored(&self.frame, &source, Gravity::Center)
            }
            Err(e) => log::warn!("Skipping composite of {}: {}", path.display(), e),
        }
    }

    /// Loads a composite source and brings it to this image's format.
    fn load_overlay(&self, path: &Path) -> Result<Frame> {
        let source = self.loader.load(path)?;
        self.converted(source, self.format())
    }

    /// Writes the image to `path` in its current format.
    ///
    /// When `path` lacks the format's extension the file is written to
    /// `path.<ext>` first and renamed onto `path`. Returns whether a file
    /// exists at `path` afterwards; errors are logged, never returned.
    pub fn save(&self) -> bool {
        let Some(path) = self.path.as_deref() else {
            log::warn!("Cannot save image without a path");
            return false;
        };

        match self.write_to(path) {
            Ok(saved) => saved,
            Err(e) => {
                log::error!("Failed to save {}: {}", path.display(), e);
                false
            }
        }
    }

    fn write_to(&self, path: &Path) -> Result<bool> {
        let staged = staging_path(path, self.ext());
        let target = staged.as_deref().unwrap_or(path);

        self.compressor.save(&self.frame, target, self.encode_quality())?;

        if let Some(staged) = staged.as_deref() {
            if staged.exists() {
                std::fs::rename(staged, path)?;
            }
        }

        Ok(path.exists())
    }

    fn encode_quality(&self) -> Option<Quality> {
        self.format().is_lossy().then_some(self.quality)
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut info = vec![
            format!(
                "path={}",
                self.path().map(|p| p.display().to_string()).unwrap_or_default()
            ),
            format!("format={}", self.format()),
            format!("content_type={}", self.content_type()),
            format!("size={}x{}", self.width(), self.height()),
            format!("datasize={}bytes", self.content().map(|c| c.len()).unwrap_or(0)),
        ];
        if self.format() == Format::Jpeg {
            info.push(format!("quality={}", self.quality));
        }
        info.push(format!("filename={}", self.filename().unwrap_or_default()));

        f.write_str(&info.join(", "))
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("path", &self.path)
            .field("format", &self.format())
            .field("width", &self.width())
            .field("height", &self.height())
            .field("quality", &self.quality())
            .field("comment", &self.comment())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn blob(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let pixels = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(pixels)
            .write_to(&mut buffer, format)
            .unwrap();
        buffer.into_inner()
    }

    fn png(width: u32, height: u32) -> ImageHandle {
        ImageHandle::from_blob(&blob(width, height, ImageFormat::Png)).unwrap()
    }

    #[test]
    fn quality_setter_reports_acceptance() {
        let mut image = png(4, 4);
        assert_eq!(image.quality(), 95);

        assert!(!image.apply_quality("150"));
        assert!(!image.apply_quality("0"));
        assert!(!image.apply_quality("7.5"));
        assert_eq!(image.quality(), 95);

        assert!(image.apply_quality("50"));
        assert_eq!(image.quality(), 50);
    }

    #[test]
    fn set_quality_takes_integers_and_strings() {
        let mut image = png(4, 4);
        image.set_quality(150);
        image.set_quality(-3);
        image.set_quality("abc");
        image.set_quality(12.5);
        image.set_quality(50.0_f64);
        image.set_quality("50.0");
        assert_eq!(image.quality(), 95);

        image.set_quality(70u8);
        assert_eq!(image.quality(), 70);
        image.set_quality("100");
        assert_eq!(image.quality(), 100);
    }

    #[test]
    fn config_sets_initial_quality() {
        let config = ImageConfig {
            quality: 40,
            ..Default::default()
        };
        let image = ImageHandle::from_blob_with_config(&blob(4, 4, ImageFormat::Png), config).unwrap();
        assert_eq!(image.quality(), 40);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ImageConfig {
            quality: 101,
            ..Default::default()
        };
        assert!(ImageHandle::from_blob_with_config(&blob(4, 4, ImageFormat::Png), config).is_err());
    }

    #[test]
    fn resize_by_height_preserves_aspect() {
        let mut image = png(200, 100);
        image.resize_by_height(20).unwrap();
        assert_eq!((image.width(), image.height()), (40, 20));
    }

    #[test]
    fn resize_by_width_percentage() {
        let mut image = png(200, 100);
        image.resize_by_width("25%").unwrap();
        assert_eq!((image.width(), image.height()), (50, 25));
    }

    #[test]
    fn resize_mixes_pixels_and_percentages() {
        let mut image = png(200, 100);
        image.resize(30, "300%").unwrap();
        assert_eq!((image.width(), image.height()), (30, 100));
    }

    #[test]
    fn resize_rejects_garbage() {
        let mut image = png(20, 10);
        assert!(image.resize("wide", 5).is_err());
        assert_eq!((image.width(), image.height()), (20, 10));
    }

    #[test]
    fn crop_defaults_fill_in_missing_fields() {
        let mut image = png(100, 80);
        image.crop(CropOptions::new()).unwrap();
        assert_eq!((image.width(), image.height()), (100, 80));

        image
            .crop(CropOptions {
                y: Some(30),
                ..Default::default()
            })
            .unwrap();
        assert_eq!((image.width(), image.height()), (100, 50));

        image.crop(CropOptions::new().at(10, 0).size(20, 20)).unwrap();
        assert_eq!((image.width(), image.height()), (20, 20));
    }

    #[test]
    fn change_format_dispatch() {
        let mut image = png(8, 8);

        image.change_format("GIF").unwrap();
        assert_eq!(image.format(), Format::Gif);

        image.change_format("bmp").unwrap();
        assert_eq!(image.format(), Format::Gif);

        image.change_format("nonsense").unwrap();
        assert_eq!(image.format(), Format::Gif);

        image.change_format("Jpeg").unwrap();
        assert_eq!(image.format(), Format::Jpeg);

        image.change_format("png").unwrap();
        assert_eq!(image.format(), Format::Png);
        assert_eq!(image.ext(), "png");
    }

    #[test]
    fn comment_round_trips_through_jpeg_conversion() {
        let mut image = png(8, 8);
        assert_eq!(image.comment(), None);

        image.set_comment("hello");
        image.to_jpeg().unwrap();
        assert_eq!(image.comment(), Some("hello"));

        let reloaded = ImageHandle::from_blob(&image.content().unwrap()).unwrap();
        assert_eq!(reloaded.comment(), Some("hello"));
    }

    #[test]
    fn display_summary() {
        let mut image = png(3, 2);
        let summary = image.to_string();
        assert!(summary.starts_with("path=, format=PNG, content_type=image/png, size=3x2, datasize="));
        assert!(summary.ends_with("bytes, filename="));
        assert!(!summary.contains("quality="));

        image.to_jpg().unwrap();
        image.set_path("photos/out.jpg");
        let summary = image.to_string();
        assert!(summary.contains("format=JPEG, content_type=image/jpeg, size=3x2"));
        assert!(summary.contains(", quality=95, filename=out.jpg"));
    }

    #[test]
    fn debug_lists_state() {
        let image = png(3, 2);
        let debug = format!("{:?}", image);
        assert!(debug.contains("ImageHandle"));
        assert!(debug.contains("Png"));
    }
}
