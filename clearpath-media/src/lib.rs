//! clearpath-media: image intake for the recolor and imagine tools.

pub mod image;

pub use image::{ImageData, detect_mime, extension_for, load_image, write_image};
