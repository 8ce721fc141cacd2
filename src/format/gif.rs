//! GIF logical screen descriptor.
//!
//! ```text
//! Bytes 0-5:  Signature ("GIF87a" or "GIF89a")
//! Bytes 6-7:  Logical screen width (u16, little-endian)
//! Bytes 8-9:  Logical screen height (u16, little-endian)
//! ```
//!
//! GIF carries no density metadata.

use crate::error::SniffError;
use crate::format::ImageFormat;
use crate::io::ByteOrder;
use crate::probe::ImageDimensions;

/// Decode width and height from the classification prefix.
pub fn dimensions(head: &[u8]) -> Result<ImageDimensions, SniffError> {
    let fields = head
        .get(6..10)
        .ok_or_else(|| SniffError::malformed(ImageFormat::Gif, "screen descriptor is truncated"))?;

    Ok(ImageDimensions::new(
        u32::from(ByteOrder::LittleEndian.read_u16(&fields[0..2])),
        u32::from(ByteOrder::LittleEndian.read_u16(&fields[2..4])),
    ))
}
