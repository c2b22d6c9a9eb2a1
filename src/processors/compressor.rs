// simple-image/src/processors/compressor.rs
use super::MetadataProcessor;
use crate::core::{Format, Frame, Quality, Result};
use crate::utils::format_file_size;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;

/// Encodes frames in their tagged format.
///
/// Quality is a per-call parameter and only affects JPEG output.
#[derive(Clone, Default)]
pub struct Compressor {
    metadata: MetadataProcessor,
}

impl Compressor {
    pub fn new() -> Self {
        Self {
            metadata: MetadataProcessor::new(),
        }
    }

    pub fn compress_to_bytes(&self, frame: &Frame, quality: Option<Quality>) -> Result<Vec<u8>> {
        let format = frame.format();
        let pixels = frame.pixels();
        let mut buffer = Cursor::new(Vec::new());

        match format {
            Format::Jpeg => {
                let quality = quality.unwrap_or_default();
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.value());
                encoder.encode_image(&pixels.to_rgb8())?;
            }
            Format::Png | Format::Tiff => {
                pixels.write_to(&mut buffer, format.image_format())?;
            }
            Format::Gif | Format::Bmp | Format::WebP => {
                DynamicImage::ImageRgba8(pixels.to_rgba8())
                    .write_to(&mut buffer, format.image_format())?;
            }
        }

        self.metadata.embed_comment(frame, buffer.into_inner())
    }

    pub fn save(&self, frame: &Frame, path: &Path, quality: Option<Quality>) -> Result<()> {
        log::debug!(
            "Saving image to {} with format {}, quality: {}",
            path.display(),
            frame.format(),
            quality.map_or_else(|| "-".to_string(), |q| q.to_string())
        );

        let data = self.compress_to_bytes(frame, quality)?;
        std::fs::write(path, data)?;
        self.log_save_result(path)
    }

    fn log_save_result(&self, path: &Path) -> Result<()> {
        let file_size = std::fs::metadata(path)?.len();
        log::info!("Saved image: {} ({})", path.display(), format_file_size(file_size));
        Ok(())
    }
}
