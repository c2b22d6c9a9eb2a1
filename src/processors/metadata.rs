// simple-image/src/processors/metadata.rs
use crate::core::{Format, Frame, Result, SimpleImageError};
use img_parts::jpeg::{Jpeg, JpegSegment};
use img_parts::png::{Png, PngChunk};
use img_parts::Bytes;

pub const COMMENT_KEY: &str = "comment";

const COM: u8 = 0xFE;
// segment length field is u16 and counts itself
const MAX_SEGMENT_CONTENTS: usize = u16::MAX as usize - 2;
const APP_MARKERS: std::ops::RangeInclusive<u8> = 0xE0..=0xEF;

const TEXT_CHUNK: [u8; 4] = *b"tEXt";
const INTL_TEXT_CHUNK: [u8; 4] = *b"iTXt";
const PNG_COMMENT_KEYWORD: &[u8] = b"Comment";

/// Moves the comment property between a [`Frame`] and its encoded container.
///
/// JPEG stores it in COM segments (split when longer than one segment
/// allows, joined again on read), PNG in a `tEXt` (Latin-1) or `iTXt`
/// (UTF-8) chunk. Other formats keep it in memory only.
#[derive(Clone, Default)]
pub struct MetadataProcessor;

impl MetadataProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn comment<'a>(&self, frame: &'a Frame) -> Option<&'a str> {
        frame.property(COMMENT_KEY)
    }

    pub fn set_comment(&self, frame: &mut Frame, comment: impl Into<String>) {
        frame.set_property(COMMENT_KEY, comment);
    }

    pub fn read_comment(&self, data: &[u8], format: Format) -> Option<String> {
        let comment = match format {
            Format::Jpeg => read_jpeg_comment(data),
            Format::Png => read_png_comment(data),
            _ => None,
        };

        if let Some(text) = &comment {
            log::debug!("Found {} comment ({} chars)", format, text.chars().count());
        }
        comment
    }

    /// Returns `data` with the frame's comment embedded, or unchanged when
    /// there is no comment or the format has no comment container.
    pub fn embed_comment(&self, frame: &Frame, data: Vec<u8>) -> Result<Vec<u8>> {
        let Some(comment) = self.comment(frame) else {
            return Ok(data);
        };

        match frame.format() {
            Format::Jpeg => embed_jpeg_comment(data, comment),
            Format::Png => embed_png_comment(data, comment),
            other => {
                log::debug!("{} has no comment container, keeping comment in memory", other);
                Ok(data)
            }
        }
    }
}

fn read_jpeg_comment(data: &[u8]) -> Option<String> {
    let jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(data)).ok()?;
    let mut text = Vec::new();
    let mut found = false;
    for segment in jpeg.segments().iter().filter(|segment| segment.marker() == COM) {
        text.extend_from_slice(segment.contents());
        found = true;
    }
    found.then(|| String::from_utf8_lossy(&text).into_owned())
}

fn read_png_comment(data: &[u8]) -> Option<String> {
    let png = Png::from_bytes(Bytes::copy_from_slice(data)).ok()?;
    png.chunks().iter().find_map(|chunk| match chunk.kind() {
        TEXT_CHUNK => parse_text_chunk(chunk.contents()),
        INTL_TEXT_CHUNK => parse_intl_text_chunk(chunk.contents()),
        _ => None,
    })
}

fn split_keyword(contents: &[u8]) -> Option<(&[u8], &[u8])> {
    let nul = contents.iter().position(|&b| b == 0)?;
    Some((&contents[..nul], &contents[nul + 1..]))
}

fn parse_text_chunk(contents: &[u8]) -> Option<String> {
    let (keyword, text) = split_keyword(contents)?;
    if !keyword.eq_ignore_ascii_case(PNG_COMMENT_KEYWORD) {
        return None;
    }
    Some(text.iter().map(|&b| b as char).collect())
}

fn parse_intl_text_chunk(contents: &[u8]) -> Option<String> {
    let (keyword, rest) = split_keyword(contents)?;
    if !keyword.eq_ignore_ascii_case(PNG_COMMENT_KEYWORD) || rest.len() < 2 {
        return None;
    }
    // compressed iTXt is not produced by this crate
    if rest[0] != 0 {
        return None;
    }
    let (_language, rest) = split_keyword(&rest[2..])?;
    let (_translated, text) = split_keyword(rest)?;
    Some(String::from_utf8_lossy(text).into_owned())
}

fn embed_jpeg_comment(data: Vec<u8>, comment: &str) -> Result<Vec<u8>> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(data)).map_err(|e| {
        SimpleImageError::ProcessingError(format!("Failed to parse JPEG for comment: {}", e))
    })?;

    let segments = jpeg.segments_mut();
    segments.retain(|segment| segment.marker() != COM);

    // after the APPn block so JFIF/EXIF stay first
    let position = segments
        .iter()
        .position(|segment| !APP_MARKERS.contains(&segment.marker()))
        .unwrap_or(segments.len());
    let pieces: Vec<&[u8]> = if comment.is_empty() {
        vec![comment.as_bytes()]
    } else {
        comment.as_bytes().chunks(MAX_SEGMENT_CONTENTS).collect()
    };
    segments.splice(
        position..position,
        pieces
            .into_iter()
            .map(|piece| JpegSegment::new_with_contents(COM, Bytes::copy_from_slice(piece))),
    );

    let mut output = Vec::new();
    jpeg.encoder().write_to(&mut output)?;
    Ok(output)
}

fn embed_png_comment(data: Vec<u8>, comment: &str) -> Result<Vec<u8>> {
    let mut png = Png::from_bytes(Bytes::from(data)).map_err(|e| {
        SimpleImageError::ProcessingError(format!("Failed to parse PNG for comment: {}", e))
    })?;

    let chunk = if comment.chars().all(|c| (c as u32) <= 0xFF) {
        let mut contents = PNG_COMMENT_KEYWORD.to_vec();
        contents.push(0);
        contents.extend(comment.chars().map(|c| c as u8));
        PngChunk::new(TEXT_CHUNK, Bytes::from(contents))
    } else {
        let mut contents = PNG_COMMENT_KEYWORD.to_vec();
        // NUL, uncompressed, method 0, empty language tag, empty translated keyword
        contents.extend_from_slice(&[0, 0, 0, 0, 0]);
        contents.extend_from_slice(comment.as_bytes());
        PngChunk::new(INTL_TEXT_CHUNK, Bytes::from(contents))
    };

    let chunks = png.chunks_mut();
    chunks.retain(|existing| {
        let kind = existing.kind();
        if kind != TEXT_CHUNK && kind != INTL_TEXT_CHUNK {
            return true;
        }
        !split_keyword(existing.contents())
            .is_some_and(|(keyword, _)| keyword.eq_ignore_ascii_case(PNG_COMMENT_KEYWORD))
    });
    // IHDR must stay first
    let position = 1.min(chunks.len());
    chunks.insert(position, chunk);

    let mut output = Vec::new();
    png.encoder().write_to(&mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(8, 8)
            .write_to(&mut buffer, format)
            .unwrap();
        buffer.into_inner()
    }

    fn frame_with_comment(format: Format, comment: &str) -> Frame {
        let mut frame = Frame::new(DynamicImage::new_rgb8(8, 8), format);
        MetadataProcessor::new().set_comment(&mut frame, comment);
        frame
    }

    #[test]
    fn jpeg_comment_survives_embedding() {
        let processor = MetadataProcessor::new();
        let frame = frame_with_comment(Format::Jpeg, "shot on film");

        let data = processor.embed_comment(&frame, encoded(ImageFormat::Jpeg)).unwrap();
        assert_eq!(
            processor.read_comment(&data, Format::Jpeg).as_deref(),
            Some("shot on film")
        );
        assert!(image::load_from_memory(&data).is_ok());
    }

    #[test]
    fn long_jpeg_comment_spans_several_segments() {
        let processor = MetadataProcessor::new();
        let comment = "é".repeat(40_000);
        let frame = frame_with_comment(Format::Jpeg, &comment);

        let data = processor.embed_comment(&frame, encoded(ImageFormat::Jpeg)).unwrap();
        let jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(&data)).unwrap();
        let count = jpeg.segments().iter().filter(|s| s.marker() == COM).count();
        assert_eq!(count, 2);

        assert_eq!(processor.read_comment(&data, Format::Jpeg), Some(comment));
        assert!(image::load_from_memory(&data).is_ok());
    }

    #[test]
    fn png_comment_uses_text_or_intl_text() {
        let processor = MetadataProcessor::new();

        for comment in ["café", "写真"] {
            let frame = frame_with_comment(Format::Png, comment);
            let data = processor.embed_comment(&frame, encoded(ImageFormat::Png)).unwrap();
            assert_eq!(processor.read_comment(&data, Format::Png).as_deref(), Some(comment));
            assert!(image::load_from_memory(&data).is_ok());
        }
    }

    #[test]
    fn embedding_replaces_previous_comment() {
        let processor = MetadataProcessor::new();
        let first = processor
            .embed_comment(&frame_with_comment(Format::Png, "old"), encoded(ImageFormat::Png))
            .unwrap();
        let second = processor
            .embed_comment(&frame_with_comment(Format::Png, "new"), first)
            .unwrap();

        assert_eq!(processor.read_comment(&second, Format::Png).as_deref(), Some("new"));
    }

    #[test]
    fn no_comment_leaves_bytes_untouched() {
        let processor = MetadataProcessor::new();
        let frame = Frame::new(DynamicImage::new_rgb8(8, 8), Format::Png);
        let data = encoded(ImageFormat::Png);

        assert_eq!(processor.embed_comment(&frame, data.clone()).unwrap(), data);
        assert_eq!(processor.read_comment(&data, Format::Png), None);
    }
}
