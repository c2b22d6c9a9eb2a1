// simple-image/src/processors/loader.rs
use super::MetadataProcessor;
use crate::core::{Format, Frame, Result, SimpleImageError};
use image::ImageReader;
use std::io::Cursor;
use std::path::Path;

#[derive(Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
    metadata: MetadataProcessor,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((100_000, 100_000)),
            metadata: MetadataProcessor::new(),
        }
    }

    pub fn with_max_dimensions(mut self, dimensions: Option<(u32, u32)>) -> Self {
        self.max_dimensions = dimensions;
        self
    }

    /// Decodes the first frame of the file at `path`.
    pub fn load(&self, path: &Path) -> Result<Frame> {
        log::debug!("Loading image from: {}", path.display());

        if !path.is_file() {
            return Err(SimpleImageError::FileNotFound(path.to_path_buf()));
        }

        let data = std::fs::read(path)?;
        let frame = self.load_from_bytes(&data)?;

        log::info!(
            "Loaded image: {} ({}x{} {})",
            path.display(),
            frame.columns(),
            frame.rows(),
            frame.format()
        );

        Ok(frame)
    }

    /// Decodes the first frame of an in-memory image. The container format
    /// is sniffed from the data, never taken from a file name.
    pub fn load_from_bytes(&self, data: &[u8]) -> Result<Frame> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;

        let format = reader
            .format()
            .ok_or_else(|| SimpleImageError::UnsupportedFormat("unrecognised image data".to_string()))
            .and_then(|detected| {
                Format::from_image_format(detected)
                    .ok_or_else(|| SimpleImageError::UnsupportedFormat(format!("{:?}", detected)))
            })?;

        let pixels = reader.decode().map_err(|e| {
            SimpleImageError::ProcessingError(format!("Failed to decode image: {}", e))
        })?;

        if let Some((max_w, max_h)) = self.max_dimensions {
            let (width, height) = (pixels.width(), pixels.height());
            if width > max_w || height > max_h {
                return Err(SimpleImageError::MemoryLimitExceeded(format!(
                    "Image dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }

        let mut frame = Frame::new(pixels, format);
        if let Some(comment) = self.metadata.read_comment(data, format) {
            self.metadata.set_comment(&mut frame, comment);
        }

        Ok(frame)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
