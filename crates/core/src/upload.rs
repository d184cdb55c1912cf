//! Upload validation for analysis images.
//!
//! Checks the client-supplied filename and size, then sniffs the bytes with
//! the `image` crate to confirm they really are a supported image and to
//! read the header dimensions. No pixel data is decoded.

use std::io::Cursor;
use std::sync::LazyLock;

use image::{ImageFormat, ImageReader};
use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum accepted upload size (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted file extensions, lowercase.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Whitespace runs collapse to a single underscore.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Anything outside the portable filename alphabet is dropped.
static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid regex"));

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

/// Image formats the analysis pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    Png,
    Jpeg,
    Webp,
}

impl UploadFormat {
    /// Map a lowercase file extension to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }
}

/// What we learned about an uploaded image without decoding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub format: UploadFormat,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
}

// ---------------------------------------------------------------------------
// Filename handling
// ---------------------------------------------------------------------------

/// Lowercase extension of `filename`, if it has one.
pub fn file_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Whether the filename carries one of [`ALLOWED_EXTENSIONS`].
pub fn is_allowed_file(filename: &str) -> bool {
    file_extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduce a client-supplied filename to a safe, portable form.
///
/// Path components are discarded, whitespace becomes `_`, characters outside
/// `[A-Za-z0-9_.-]` are dropped and leading dots/underscores are stripped.
/// May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let basename = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    let collapsed = WHITESPACE_RE.replace_all(basename.trim(), "_");
    let cleaned = UNSAFE_CHARS_RE.replace_all(&collapsed, "");
    cleaned.trim_start_matches(['.', '_']).to_string()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the filename and size of an upload before looking at its bytes.
///
/// Returns the declared format on success.
pub fn validate_upload(filename: &str, size_bytes: usize) -> Result<UploadFormat, CoreError> {
    if filename.trim().is_empty() {
        return Err(CoreError::Validation("Empty filename".to_string()));
    }
    let format = file_extension(filename)
        .filter(|_| is_allowed_file(filename))
        .and_then(|ext| UploadFormat::from_extension(&ext))
        .ok_or_else(|| CoreError::Validation("File format not allowed".to_string()))?;

    if size_bytes == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".to_string()));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "File exceeds maximum size of {MAX_UPLOAD_BYTES} bytes (got {size_bytes})"
        )));
    }
    Ok(format)
}

/// Sniff `bytes`, check they match the `declared` format and read the header
/// dimensions.
pub fn inspect_image(bytes: &[u8], declared: UploadFormat) -> Result<ImageInfo, CoreError> {
    let sniffed = image::guess_format(bytes)
        .ok()
        .and_then(UploadFormat::from_image_format)
        .ok_or_else(|| {
            CoreError::Validation("File content is not a supported image".to_string())
        })?;

    if sniffed != declared {
        return Err(CoreError::Validation(format!(
            "File content is {} but the filename says {}",
            sniffed.mime_type(),
            declared.mime_type()
        )));
    }

    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("Unreadable image header: {e}")))?;

    Ok(ImageInfo {
        format: sniffed,
        width,
        height,
        size_bytes: bytes.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("cow.JPG").as_deref(), Some("jpg"));
        assert_eq!(file_extension("archive.tar.gz").as_deref(), Some("gz"));
    }

    #[test]
    fn extension_missing_or_trailing_dot() {
        assert_eq!(file_extension("cow"), None);
        assert_eq!(file_extension("cow."), None);
    }

    #[test]
    fn allowed_extensions() {
        assert!(is_allowed_file("a.png"));
        assert!(is_allowed_file("a.jpeg"));
        assert!(is_allowed_file("a.WEBP"));
        assert!(!is_allowed_file("a.gif"));
        assert!(!is_allowed_file("png"));
    }

    #[test]
    fn secure_filename_strips_paths_and_unsafe_chars() {
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename(r"C:\photos\my cow.png"), "my_cow.png");
        assert_eq!(secure_filename("..hidden.jpg"), "hidden.jpg");
        assert_eq!(secure_filename("vaca ñ 1.png"), "vaca__1.png");
        assert_eq!(secure_filename("   "), "");
    }

    #[test]
    fn validate_rejects_empty_filename() {
        assert_matches!(
            validate_upload("", 10),
            Err(CoreError::Validation(msg)) if msg == "Empty filename"
        );
    }

    #[test]
    fn validate_rejects_disallowed_extension() {
        assert_matches!(
            validate_upload("cow.gif", 10),
            Err(CoreError::Validation(msg)) if msg == "File format not allowed"
        );
    }

    #[test]
    fn validate_rejects_empty_and_oversized_files() {
        assert_matches!(validate_upload("cow.png", 0), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_upload("cow.png", MAX_UPLOAD_BYTES + 1),
            Err(CoreError::Validation(_))
        );
        assert_eq!(
            validate_upload("cow.png", MAX_UPLOAD_BYTES).unwrap(),
            UploadFormat::Png
        );
    }

    #[test]
    fn jpg_and_jpeg_both_map_to_jpeg() {
        assert_eq!(validate_upload("a.jpg", 1).unwrap(), UploadFormat::Jpeg);
        assert_eq!(validate_upload("a.JPEG", 1).unwrap(), UploadFormat::Jpeg);
    }

    #[test]
    fn inspect_reads_png_dimensions() {
        let bytes = encode(ImageFormat::Png, 32, 24);
        let info = inspect_image(&bytes, UploadFormat::Png).unwrap();
        assert_eq!(info.format, UploadFormat::Png);
        assert_eq!((info.width, info.height), (32, 24));
        assert_eq!(info.size_bytes, bytes.len());
    }

    #[test]
    fn inspect_reads_jpeg_dimensions() {
        let bytes = encode(ImageFormat::Jpeg, 16, 8);
        let info = inspect_image(&bytes, UploadFormat::Jpeg).unwrap();
        assert_eq!((info.width, info.height), (16, 8));
    }

    #[test]
    fn inspect_rejects_mismatched_format() {
        let bytes = encode(ImageFormat::Png, 4, 4);
        assert_matches!(
            inspect_image(&bytes, UploadFormat::Jpeg),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn inspect_rejects_non_image_bytes() {
        assert_matches!(
            inspect_image(b"definitely not an image", UploadFormat::Png),
            Err(CoreError::Validation(_))
        );
    }
}
