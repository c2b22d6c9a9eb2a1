// simple-image/src/core/frame.rs
use super::Format;
use image::DynamicImage;
use std::collections::BTreeMap;

/// Decoded pixels plus the format tag and string properties that travel with them.
///
/// Transforms never mutate pixels in place: they build a new frame through
/// [`Frame::with_pixels`], which keeps the tag and properties.
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: DynamicImage,
    format: Format,
    properties: BTreeMap<String, String>,
}

impl Frame {
    pub fn new(pixels: DynamicImage, format: Format) -> Self {
        Self {
            pixels,
            format,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_pixels(&self, pixels: DynamicImage) -> Self {
        Self {
            pixels,
            format: self.format,
            properties: self.properties.clone(),
        }
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn columns(&self) -> u32 {
        self.pixels.width()
    }

    pub fn rows(&self) -> u32 {
        self.pixels.height()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_pixels_keeps_tag_and_properties() {
        let mut frame = Frame::new(DynamicImage::new_rgb8(4, 3), Format::Gif);
        frame.set_property("comment", "hello");

        let next = frame.with_pixels(DynamicImage::new_rgb8(2, 2));
        assert_eq!(next.format(), Format::Gif);
        assert_eq!(next.property("comment"), Some("hello"));
        assert_eq!((next.columns(), next.rows()), (2, 2));
        assert_eq!((frame.columns(), frame.rows()), (4, 3));
    }
}
