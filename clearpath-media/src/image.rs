//! Image bytes plus their MIME type, loaded from disk or returned by the model.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

/// Message shown when the chosen file is not an image.
pub const INVALID_IMAGE: &str = "Please select a valid image file.";

#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Sniff the MIME type from magic bytes.
pub fn detect_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        _ => None,
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// File extension conventionally used for a MIME type.
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "png",
    }
}

/// Read an image file, rejecting anything that is not an image.
pub fn load_image(path: impl AsRef<Path>) -> Result<ImageData> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    if bytes.is_empty() {
        bail!(INVALID_IMAGE);
    }

    let Some(mime) = detect_mime(&bytes).or_else(|| mime_from_extension(path)) else {
        bail!(INVALID_IMAGE);
    };

    tracing::debug!(path = %path.display(), mime, len = bytes.len(), "loaded image");
    Ok(ImageData::new(mime, bytes))
}

/// Write image bytes, adding an extension from the MIME type when the path has none.
///
/// Returns the path actually written.
pub fn write_image(path: impl AsRef<Path>, image: &ImageData) -> Result<PathBuf> {
    let mut out = path.as_ref().to_path_buf();
    if out.extension().is_none() {
        out.set_extension(extension_for(&image.mime_type));
    }
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&out, &image.bytes).with_context(|| format!("write {}", out.display()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_detect_common_formats() {
        assert_eq!(detect_mime(&PNG_HEADER), Some("image/png"));
        assert_eq!(detect_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(detect_mime(b"GIF89a"), Some("image/gif"));
        assert_eq!(detect_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(detect_mime(b"hello"), None);
    }

    #[test]
    fn test_load_rejects_text_file() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("notes.txt");
        fs::write(&p, "not an image").unwrap();
        let err = load_image(&p).unwrap_err();
        assert_eq!(err.to_string(), INVALID_IMAGE);
    }

    #[test]
    fn test_load_png_by_magic() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("photo.bin");
        fs::write(&p, PNG_HEADER).unwrap();
        let img = load_image(&p).unwrap();
        assert_eq!(img.mime_type, "image/png");
        assert_eq!(img.len(), 8);
    }

    #[test]
    fn test_write_adds_extension() {
        let dir = tempdir().unwrap();
        let img = ImageData::new("image/jpeg", vec![0xFF, 0xD8, 0xFF]);
        let written = write_image(dir.path().join("out/fixed"), &img).unwrap();
        assert_eq!(written.extension().unwrap(), "jpg");
        assert_eq!(fs::read(written).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }
}
