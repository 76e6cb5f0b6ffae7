//! Supported image extensions.
//!
//! This module is the single source of truth for which file names count as
//! recognizable images. Membership is decided by the file suffix alone,
//! compared case-insensitively. There is no MIME sniffing and no wildcard matching.
//!
//! # Example
//!
//! ```rust
//! use ocrbatch::core::formats::is_recognized;
//!
//! assert!(is_recognized("scan-001.PNG"));
//! assert!(is_recognized("scan-001.png"));
//! assert!(!is_recognized("notes.txt"));
//! ```

use ahash::AHashSet;
use once_cell::sync::Lazy;
use std::path::Path;

/// Every image suffix the engine is expected to handle, with leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // Common formats
    ".jpg", ".jpeg", ".png", ".gif", ".bmp",
    // TIFF variants
    ".tif", ".tiff",
    // Modern formats
    ".webp", ".heic", ".heif",
    // Professional formats
    ".tga", ".psd", ".pcx",
    // Document formats
    ".pdf", ".jp2", ".j2k", ".jpf", ".jpx", ".jpm", ".mj2",
    // Raw and specialized formats
    ".pbm", ".pgm", ".ppm", ".pnm", ".pfm", ".pam",
    // Additional formats
    ".dib", ".rle", ".ico", ".cur",
];

static EXTENSION_SET: Lazy<AHashSet<&'static str>> = Lazy::new(|| SUPPORTED_EXTENSIONS.iter().copied().collect());

/// Returns the lower-cased extension of `name` with its leading dot.
///
/// Names without an extension, including dot-files such as `.png`, yield `None`.
pub fn normalized_extension(name: impl AsRef<Path>) -> Option<String> {
    name.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}

/// Check whether a file name carries a supported image extension.
///
/// The file does not need to exist. This never fails.
pub fn is_recognized(name: impl AsRef<Path>) -> bool {
    normalized_extension(name).is_some_and(|ext| EXTENSION_SET.contains(ext.as_str()))
}

/// Supported extensions as owned strings, for error reports.
pub fn supported_extensions() -> Vec<String> {
    SUPPORTED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}
