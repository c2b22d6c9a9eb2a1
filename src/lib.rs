//! A small, uniform facade for everyday image editing: load from a file or
//! a byte buffer, convert between PNG/JPEG/GIF, resize, crop, composite,
//! control JPEG quality, attach a comment and save back to a path.
//!
//! Pixel work is done by the [`image`] crate; this crate only reconciles the
//! in-memory state (format tag, quality, path) with what ends up on disk.

mod core;
mod processors;
mod utils;

pub use crate::core::{
    CropOptions, Format, Frame, Gravity, ImageConfig, ImageHandle, IntoQuality, Quality,
    ResizeAlgorithm, Result, SimpleImageError, DEFAULT_QUALITY,
};
pub use crate::processors::{
    Compositor, Compressor, Cropper, Dimension, IntoDimension, Loader, MetadataProcessor,
    Resizer, COMMENT_KEY,
};
pub use crate::utils::{file_name, format_file_size, staging_path};

pub mod prelude {
    pub use crate::{
        CropOptions, Dimension, Format, Gravity, ImageConfig, ImageHandle, ResizeAlgorithm,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
