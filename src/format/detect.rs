//! Signature matching for supported image containers.
//!
//! Classification looks only at the first [`HEADER_PROBE_LEN`] bytes of the
//! input. Rules are checked in a fixed order and the first match wins; the
//! standard PNG layout is tried before the legacy one because both share
//! the same signature.

use tracing::debug;

use crate::io::ByteOrder;

// =============================================================================
// Signatures
// =============================================================================

/// Number of leading bytes read to classify an input.
pub const HEADER_PROBE_LEN: usize = 24;

pub const GIF87A_SIGNATURE: &[u8; 6] = b"GIF87a";
pub const GIF89A_SIGNATURE: &[u8; 6] = b"GIF89a";
pub const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";
pub const JPEG_SIGNATURE: &[u8; 2] = b"\xFF\xD8";
pub const JP2_SIGNATURE: &[u8; 12] = b"\x00\x00\x00\x0cjP  \r\n\x87\n";
pub const TIFF_BE_SIGNATURE: &[u8; 4] = b"MM\x00\x2a";
pub const TIFF_LE_SIGNATURE: &[u8; 4] = b"II\x2a\x00";

// =============================================================================
// ImageFormat
// =============================================================================

/// Detected image container format.
///
/// Determined once per input from its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Gif,

    /// PNG with IHDR immediately after the signature
    Png,

    /// PNG signature without an adjacent IHDR; width and height are read
    /// straight after the signature
    PngLegacy,

    Jpeg,

    /// JP2 file format (JPEG 2000 part 1)
    Jpeg2000,

    /// TIFF in the given byte order
    Tiff(ByteOrder),
}

impl ImageFormat {
    /// Get a human-readable name for the format.
    pub const fn name(&self) -> &'static str {
        match self {
            ImageFormat::Gif => "GIF",
            ImageFormat::Png => "PNG",
            ImageFormat::PngLegacy => "PNG (legacy)",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Jpeg2000 => "JPEG2000",
            ImageFormat::Tiff(ByteOrder::BigEndian) => "TIFF (big-endian)",
            ImageFormat::Tiff(ByteOrder::LittleEndian) => "TIFF (little-endian)",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Format Detection
// =============================================================================

/// Classify an input from its leading bytes.
///
/// `head` is whatever could be read of the first [`HEADER_PROBE_LEN`]
/// bytes; it may be shorter for small inputs. Returns `None` when no
/// signature matches.
pub fn detect_format(head: &[u8]) -> Option<ImageFormat> {
    let format = classify(head);
    match format {
        Some(format) => debug!(format = format.name(), len = head.len(), "Matched image signature"),
        None => debug!(len = head.len(), "No image signature matched"),
    }
    format
}

fn classify(head: &[u8]) -> Option<ImageFormat> {
    let len = head.len();

    if len >= 10 && (head.starts_with(GIF87A_SIGNATURE) || head.starts_with(GIF89A_SIGNATURE)) {
        return Some(ImageFormat::Gif);
    }

    if len >= 24 && head.starts_with(PNG_SIGNATURE) && &head[12..16] == b"IHDR" {
        return Some(ImageFormat::Png);
    }

    if len >= 16 && head.starts_with(PNG_SIGNATURE) {
        return Some(ImageFormat::PngLegacy);
    }

    if head.starts_with(JPEG_SIGNATURE) {
        return Some(ImageFormat::Jpeg);
    }

    if head.starts_with(JP2_SIGNATURE) {
        return Some(ImageFormat::Jpeg2000);
    }

    if len >= 8 && head.starts_with(TIFF_BE_SIGNATURE) {
        return Some(ImageFormat::Tiff(ByteOrder::BigEndian));
    }

    if len >= 8 && head.starts_with(TIFF_LE_SIGNATURE) {
        return Some(ImageFormat::Tiff(ByteOrder::LittleEndian));
    }

    None
}

// =============================================================================
// Tests
// =============================================================================
