// simple-image/src/processors/mod.rs
mod compositor;
mod compressor;
mod cropper;
mod loader;
mod metadata;
mod resizer;

pub use compositor::Compositor;
pub use compressor::Compressor;
pub use cropper::Cropper;
pub use loader::Loader;
pub use metadata::{MetadataProcessor, COMMENT_KEY};
pub use resizer::{Dimension, IntoDimension, Resizer};

