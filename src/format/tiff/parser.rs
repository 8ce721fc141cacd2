//! TIFF header and image file directory parsing.
//!
//! # TIFF Header Structure
//!
//! ```text
//! Bytes 0-1: Byte order ("II" = little-endian, "MM" = big-endian)
//! Bytes 2-3: Version (42)
//! Bytes 4-7: Offset to first IFD (u32)
//! ```
//!
//! # IFD Structure
//!
//! ```text
//! Entry count: u16
//! Entries:     count x 12 bytes (tag u16, type u16, count u32, value/offset 4 bytes)
//! Next IFD:    u32 (never followed here)
//! ```

use tracing::trace;

use super::tags::{FieldType, TiffTag};
use crate::error::{IoError, TiffError};
use crate::io::{ByteOrder, ByteSource};

// =============================================================================
// Constants
// =============================================================================

/// Size of the TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of one IFD entry in bytes
pub const IFD_ENTRY_SIZE: usize = 12;

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the file
    pub byte_order: ByteOrder,

    /// Offset to the first IFD, relative to the start of the file
    pub first_ifd_offset: u32,
}

impl TiffHeader {
    /// Parse the header from the classification prefix.
    ///
    /// The byte order comes from signature matching, so only the IFD offset
    /// is decoded here.
    pub fn parse(byte_order: ByteOrder, head: &[u8]) -> Result<Self, TiffError> {
        let offset_field = head.get(4..TIFF_HEADER_SIZE).ok_or(IoError::ShortRead {
            offset: 0,
            requested: TIFF_HEADER_SIZE,
            available: head.len(),
        })?;

        Ok(TiffHeader {
            byte_order,
            first_ifd_offset: byte_order.read_u32(offset_field),
        })
    }
}

// =============================================================================
// IfdEntry
// =============================================================================

/// A single 12-byte IFD entry.
///
/// `value` is kept as raw bytes because its meaning depends on the field
/// type: small values are stored inline (left-justified), larger ones are
/// an offset to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    pub value: [u8; 4],
}

impl IfdEntry {
    /// Decode an entry from exactly [`IFD_ENTRY_SIZE`] bytes.
    pub fn parse(bytes: &[u8], byte_order: ByteOrder) -> Self {
        let mut value = [0u8; 4];
        value.copy_from_slice(&bytes[8..12]);
        IfdEntry {
            tag: byte_order.read_u16(&bytes[0..2]),
            field_type: byte_order.read_u16(&bytes[2..4]),
            count: byte_order.read_u32(&bytes[4..8]),
            value,
        }
    }

    /// The tag, if it is one this crate reads.
    #[inline]
    pub fn tag(&self) -> Option<TiffTag> {
        TiffTag::from_u16(self.tag)
    }

    /// The field type, if it is one this crate understands.
    #[inline]
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::from_u16(self.field_type)
    }

    /// The value field read as a whole 32-bit word.
    #[inline]
    pub fn value_u32(&self, byte_order: ByteOrder) -> u32 {
        byte_order.read_u32(&self.value)
    }

    /// The first SHORT stored inline in the value field.
    #[inline]
    pub fn value_u16(&self, byte_order: ByteOrder) -> u16 {
        byte_order.read_u16(&self.value[0..2])
    }
}

// =============================================================================
// IFD Walking
// =============================================================================

/// Reads the entries of the first IFD one at a time.
pub struct IfdReader<'a, S> {
    source: &'a mut S,
    byte_order: ByteOrder,
    remaining: u16,
}

impl<'a, S: ByteSource> IfdReader<'a, S> {
    /// Seek to the first IFD and read its entry count.
    pub fn open(source: &'a mut S, header: &TiffHeader) -> Result<Self, TiffError> {
        source.seek_to(u64::from(header.first_ifd_offset))?;
        let remaining = source.read_u16(header.byte_order)?;
        trace!(
            offset = header.first_ifd_offset,
            entries = remaining,
            "TIFF IFD"
        );
        Ok(Self {
            source,
            byte_order: header.byte_order,
            remaining,
        })
    }

    /// Read the next entry, or `None` once the directory is exhausted.
    pub fn next_entry(&mut self) -> Result<Option<IfdEntry>, TiffError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let bytes = self.source.read_exact_bytes(IFD_ENTRY_SIZE)?;
        self.remaining -= 1;

        let entry = IfdEntry::parse(&bytes, self.byte_order);
        trace!(
            tag = entry.tag,
            field_type = entry.field_type,
            count = entry.count,
            "TIFF entry"
        );
        Ok(Some(entry))
    }
}

// =============================================================================
// Tests
// =============================================================================
