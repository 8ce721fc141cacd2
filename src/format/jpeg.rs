//! JPEG marker segment traversal.
//!
//! A JPEG stream is a sequence of marker segments following SOI (FFD8):
//!
//! ```text
//! FF <marker> <length: u16 BE, includes itself> <length - 2 payload bytes>
//! ```
//!
//! Any number of FF fill bytes may precede a marker. Frame dimensions live
//! in the first Start Of Frame segment (C0-CF except C4, C8 and CC), whose
//! payload is `precision: u8, height: u16, width: u16, ...`. JFIF density
//! lives in the APP0 segment.

use tracing::trace;

use crate::error::{IoError, SniffError};
use crate::format::ImageFormat;
use crate::io::{ByteOrder, ByteSource};
use crate::probe::{DensityReading, ImageDimensions};
use crate::units::{convert_to_dpi, DensityUnit};

// =============================================================================
// JPEG Markers
// =============================================================================

/// Define Huffman Table marker (inside the SOF range, not a frame)
pub const DHT: u8 = 0xC4;

/// Reserved JPEG extension marker (inside the SOF range, not a frame)
pub const JPG: u8 = 0xC8;

/// Define Arithmetic Coding conditioning marker (inside the SOF range, not a frame)
pub const DAC: u8 = 0xCC;

/// Start Of Scan marker
pub const SOS: u8 = 0xDA;

/// End Of Image marker
pub const EOI: u8 = 0xD9;

/// Application segment 0 (JFIF) marker
pub const APP0: u8 = 0xE0;

/// Temporary private use marker (no payload)
const TEM: u8 = 0x01;

/// JFIF identifier ("JFIF\0") and version bytes preceding the density fields.
const JFIF_PREAMBLE_LEN: u64 = 7;

/// JFIF density unit: dots per inch
const JFIF_UNITS_DPI: u8 = 1;

/// JFIF density unit: dots per centimeter
const JFIF_UNITS_DPCM: u8 = 2;

/// Whether `marker` starts a frame header.
#[inline]
pub const fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && marker != DHT && marker != JPG && marker != DAC
}

/// Whether `marker` stands alone without a length field.
#[inline]
const fn is_standalone(marker: u8) -> bool {
    marker == TEM || matches!(marker, 0xD0..=0xD7)
}

fn invalid(err: IoError) -> SniffError {
    SniffError::from_io(ImageFormat::Jpeg, err)
}

// =============================================================================
// Segment Walking
// =============================================================================

/// Walks marker segments from just after SOI.
struct SegmentWalker<'a, S> {
    source: &'a mut S,
    /// Payload bytes of the current segment not yet consumed
    remaining: u64,
}

impl<'a, S: ByteSource> SegmentWalker<'a, S> {
    fn new(source: &'a mut S) -> Result<Self, SniffError> {
        source.seek_to(2).map_err(invalid)?;
        Ok(Self {
            source,
            remaining: 0,
        })
    }

    /// Skip whatever is left of the current segment and read the next
    /// marker, leaving the source at the start of its payload.
    ///
    /// SOS and EOI end the header area and are returned without reading a
    /// length.
    fn next_marker(&mut self) -> Result<u8, SniffError> {
        loop {
            self.source.skip(self.remaining).map_err(invalid)?;
            self.remaining = 0;

            // Fill bytes: keep reading while the byte is FF
            let mut marker = self.source.read_u8().map_err(invalid)?;
            while marker == 0xFF {
                marker = self.source.read_u8().map_err(invalid)?;
            }

            if is_standalone(marker) {
                trace!(marker, "Standalone JPEG marker");
                continue;
            }

            if marker == SOS || marker == EOI {
                return Ok(marker);
            }

            let length = self.source.read_u16(ByteOrder::BigEndian).map_err(invalid)?;
            if length < 2 {
                return Err(SniffError::malformed(
                    ImageFormat::Jpeg,
                    format!("segment {marker:#04X} has length {length}"),
                ));
            }

            let payload_len = length - 2;
            trace!(
                marker,
                payload_len,
                offset = self.source.position(),
                "JPEG segment"
            );
            self.remaining = u64::from(payload_len);
            return Ok(marker);
        }
    }

    /// Skip `len` payload bytes of the current segment.
    fn skip_payload(&mut self, len: u64) -> Result<(), SniffError> {
        self.source.skip(len).map_err(invalid)?;
        self.remaining = self.remaining.saturating_sub(len);
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8, SniffError> {
        let value = self.source.read_u8().map_err(invalid)?;
        self.remaining = self.remaining.saturating_sub(1);
        Ok(value)
    }

    fn read_u16(&mut self) -> Result<u16, SniffError> {
        let value = self.source.read_u16(ByteOrder::BigEndian).map_err(invalid)?;
        self.remaining = self.remaining.saturating_sub(2);
        Ok(value)
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Find the first Start Of Frame segment and read its dimensions.
pub fn dimensions<S: ByteSource>(source: &mut S) -> Result<ImageDimensions, SniffError> {
    let mut walker = SegmentWalker::new(source)?;

    loop {
        let marker = walker.next_marker()?;

        if marker == SOS || marker == EOI {
            return Err(SniffError::malformed(
                ImageFormat::Jpeg,
                format!("no start-of-frame marker before {marker:#04X}"),
            ));
        }

        if is_start_of_frame(marker) {
            // Skip sample precision
            walker.skip_payload(1)?;
            let height = walker.read_u16()?;
            let width = walker.read_u16()?;
            return Ok(ImageDimensions::new(u32::from(width), u32::from(height)));
        }
    }
}

/// Read JFIF density from the APP0 segment.
///
/// Returns `None` when a frame or scan starts before any APP0, or when the
/// APP0 unit byte is not one JFIF defines.
pub fn density<S: ByteSource>(source: &mut S) -> Result<Option<DensityReading>, SniffError> {
    let mut walker = SegmentWalker::new(source)?;

    loop {
        let marker = walker.next_marker()?;

        if marker == SOS || marker == EOI || is_start_of_frame(marker) {
            return Ok(None);
        }

        if marker != APP0 {
            continue;
        }

        walker.skip_payload(JFIF_PREAMBLE_LEN)?;
        let unit = walker.read_u8()?;
        let x_density = walker.read_u16()?;
        let y_density = walker.read_u16()?;

        let reading = match unit {
            // 0 is an aspect ratio; reported as-is
            0 | JFIF_UNITS_DPI => DensityReading::new(u32::from(x_density), u32::from(y_density)),
            JFIF_UNITS_DPCM => DensityReading::new(
                convert_to_dpi(u32::from(x_density), DensityUnit::Centimeter),
                convert_to_dpi(u32::from(y_density), DensityUnit::Centimeter),
            ),
            _ => return Ok(None),
        };
        return Ok(Some(reading));
    }
}

// =============================================================================
// Tests
// =============================================================================
