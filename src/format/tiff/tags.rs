//! TIFF tag and field type definitions.
//!
//! Only the vocabulary needed to read image size and resolution from the
//! first image file directory is defined here.

// =============================================================================
// TIFF Field Types
// =============================================================================

/// TIFF field types that determine how an entry's value is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer (1 byte)
    Byte = 1,

    /// 8-bit ASCII character (1 byte)
    Ascii = 2,

    /// Unsigned 16-bit integer (2 bytes)
    Short = 3,

    /// Unsigned 32-bit integer (4 bytes)
    Long = 4,

    /// Two LONGs: numerator then denominator (8 bytes)
    Rational = 5,

    /// Undefined byte data (1 byte per element)
    Undefined = 7,
}

impl FieldType {
    /// Size of a single value of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte => 1,
            FieldType::Ascii => 1,
            FieldType::Short => 2,
            FieldType::Long => 4,
            FieldType::Rational => 8,
            FieldType::Undefined => 1,
        }
    }

    /// Create a FieldType from its numeric value.
    ///
    /// Returns `None` for types this crate never interprets.
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            7 => Some(FieldType::Undefined),
            _ => None,
        }
    }

    /// Whether `count` values of this type fit in the 4-byte value field.
    #[inline]
    pub const fn fits_inline(self, count: u32) -> bool {
        (self.size_in_bytes() as u64) * (count as u64) <= 4
    }
}

// =============================================================================
// TIFF Tags
// =============================================================================

/// TIFF tag IDs read by this crate.
///
/// Entries with any other tag are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TiffTag {
    /// Image width in pixels
    ImageWidth = 256,

    /// Image height (length) in pixels
    ImageLength = 257,

    /// Pixels per unit in X direction
    XResolution = 282,

    /// Pixels per unit in Y direction
    YResolution = 283,

    /// Unit of resolution (1=none, 2=inch, 3=centimeter)
    ResolutionUnit = 296,
}

impl TiffTag {
    /// Create a TiffTag from its numeric value.
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            256 => Some(TiffTag::ImageWidth),
            257 => Some(TiffTag::ImageLength),
            282 => Some(TiffTag::XResolution),
            283 => Some(TiffTag::YResolution),
            296 => Some(TiffTag::ResolutionUnit),
            _ => None,
        }
    }
}

// =============================================================================
// Resolution Unit
// =============================================================================

/// Values of the ResolutionUnit tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionUnit {
    /// No absolute unit; resolution is an aspect ratio
    None,

    /// Pixels per inch (the default when the tag is absent)
    #[default]
    Inch,

    /// Pixels per centimeter
    Centimeter,
}

impl ResolutionUnit {
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(ResolutionUnit::None),
            2 => Some(ResolutionUnit::Inch),
            3 => Some(ResolutionUnit::Centimeter),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
