//! PNG header and chunk handling.
//!
//! # Layout
//!
//! ```text
//! Bytes 0-7:   Signature (89 50 4E 47 0D 0A 1A 0A)
//! Bytes 8-11:  First chunk length (u32, big-endian)
//! Bytes 12-15: First chunk type ("IHDR")
//! Bytes 16-19: Width (u32, big-endian)
//! Bytes 20-23: Height (u32, big-endian)
//! ```
//!
//! Every chunk is `length | type | data | crc`, so the next chunk starts
//! `length + 12` bytes after the current one. Density lives in the optional
//! `pHYs` chunk, which must appear before the first `IDAT`.

use tracing::trace;

use crate::error::{IoError, SniffError};
use crate::format::ImageFormat;
use crate::io::{ByteOrder, ByteSource};
use crate::probe::{DensityReading, ImageDimensions};
use crate::units::{convert_to_dpi, DensityUnit};

/// Offset of the first chunk, right after the signature.
const FIRST_CHUNK_OFFSET: u64 = 8;

/// Length, type and CRC around each chunk's data.
const CHUNK_OVERHEAD: u64 = 12;

/// pHYs payload: x density (u32), y density (u32), unit specifier (u8).
const PHYS_LEN: usize = 9;

/// pHYs unit specifier meaning "pixels per meter"; 0 means aspect ratio only.
const PHYS_UNIT_METER: u8 = 1;

fn invalid(err: IoError) -> SniffError {
    SniffError::from_io(ImageFormat::Png, err)
}

/// Decode width and height from the classification prefix.
///
/// Standard files keep them in IHDR at bytes 16-24; the legacy layout has
/// them right after the signature at bytes 8-16.
pub fn dimensions(format: ImageFormat, head: &[u8]) -> Result<ImageDimensions, SniffError> {
    let range = match format {
        ImageFormat::PngLegacy => 8..16,
        _ => 16..24,
    };

    let fields = head
        .get(range)
        .ok_or_else(|| SniffError::malformed(format, "header is truncated"))?;

    Ok(ImageDimensions::new(
        ByteOrder::BigEndian.read_u32(&fields[0..4]),
        ByteOrder::BigEndian.read_u32(&fields[4..8]),
    ))
}

/// Walk chunks until `pHYs` or the first `IDAT`.
///
/// Returns `None` when image data starts before any density chunk.
pub fn density<S: ByteSource>(source: &mut S) -> Result<Option<DensityReading>, SniffError> {
    let mut offset = FIRST_CHUNK_OFFSET;

    loop {
        source.seek_to(offset).map_err(invalid)?;
        let length = source.read_u32(ByteOrder::BigEndian).map_err(invalid)?;
        let chunk_type = source.read_exact_bytes(4).map_err(invalid)?;

        trace!(
            chunk = %String::from_utf8_lossy(&chunk_type),
            length,
            offset,
            "PNG chunk"
        );

        match &chunk_type[..] {
            b"pHYs" => {
                let data = source.read_exact_bytes(PHYS_LEN).map_err(invalid)?;
                let x_density = ByteOrder::BigEndian.read_u32(&data[0..4]);
                let y_density = ByteOrder::BigEndian.read_u32(&data[4..8]);
                let unit = data[8];

                // Any non-zero unit is treated as meters; only 1 is defined
                let reading = if unit == 0 {
                    DensityReading::new(x_density, y_density)
                } else {
                    if unit != PHYS_UNIT_METER {
                        trace!(unit, "Unknown pHYs unit, assuming meters");
                    }
                    DensityReading::new(
                        convert_to_dpi(x_density, DensityUnit::Meter),
                        convert_to_dpi(y_density, DensityUnit::Meter),
                    )
                };
                return Ok(Some(reading));
            }
            b"IDAT" | b"IEND" => return Ok(None),
            _ => {
                offset = offset
                    .checked_add(u64::from(length) + CHUNK_OVERHEAD)
                    .ok_or_else(|| SniffError::malformed(ImageFormat::Png, "chunk offset overflow"))?;
            }
        }
    }
}
