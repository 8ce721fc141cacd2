//! TIFF image file directory decoding.
//!
//! Width and height come from the ImageWidth and ImageLength entries of the
//! first IFD; resolution from XResolution, YResolution and ResolutionUnit.
//!
//! Big-endian files store a SHORT left-justified in the 4-byte value field,
//! so it is read from the first two bytes. Little-endian files take the
//! value field as a whole 32-bit word for either type, which gives the same
//! result for well-formed files because the unused bytes are zero.

mod parser;
mod tags;

pub use parser::{IfdEntry, IfdReader, TiffHeader, IFD_ENTRY_SIZE, TIFF_HEADER_SIZE};
pub use tags::{FieldType, ResolutionUnit, TiffTag};

use crate::error::{SniffError, TiffError};
use crate::format::ImageFormat;
use crate::io::{ByteOrder, ByteSource};
use crate::probe::{DensityReading, ImageDimensions};
use crate::units::{convert_ratio_to_dpi, DensityUnit};

/// Decode width and height from the first IFD.
///
/// Scanning stops as soon as both entries have been seen.
pub fn dimensions<S: ByteSource>(
    source: &mut S,
    byte_order: ByteOrder,
    head: &[u8],
) -> Result<ImageDimensions, SniffError> {
    let header = TiffHeader::parse(byte_order, head)?;
    let mut reader = IfdReader::open(source, &header)?;

    let mut width = None;
    let mut height = None;

    while let Some(entry) = reader.next_entry()? {
        match entry.tag() {
            Some(TiffTag::ImageWidth) => {
                let value = size_value(&entry, byte_order)
                    .ok_or(TiffError::WidthFieldType(entry.field_type))?;
                width = Some(value);
            }
            Some(TiffTag::ImageLength) => {
                let value = size_value(&entry, byte_order)
                    .ok_or(TiffError::HeightFieldType(entry.field_type))?;
                height = Some(value);
            }
            _ => continue,
        }

        if let (Some(width), Some(height)) = (width, height) {
            return Ok(ImageDimensions::new(width, height));
        }
    }

    Err(TiffError::MissingDimensions.into())
}

/// Interpret an ImageWidth/ImageLength value.
///
/// Returns `None` when a big-endian entry is neither SHORT nor LONG.
fn size_value(entry: &IfdEntry, byte_order: ByteOrder) -> Option<u32> {
    match byte_order {
        ByteOrder::LittleEndian => Some(entry.value_u32(byte_order)),
        ByteOrder::BigEndian => match entry.field_type() {
            Some(FieldType::Short) => Some(u32::from(entry.value_u16(byte_order))),
            Some(FieldType::Long) => Some(entry.value_u32(byte_order)),
            _ => None,
        },
    }
}

// =============================================================================
// Density
// =============================================================================

/// Read the resolution from the first IFD.
///
/// Returns `None` when either resolution entry is missing or the unit is
/// not one TIFF defines.
pub fn density<S: ByteSource>(
    source: &mut S,
    byte_order: ByteOrder,
    head: &[u8],
) -> Result<Option<DensityReading>, SniffError> {
    let format = ImageFormat::Tiff(byte_order);
    let header = TiffHeader::parse(byte_order, head)?;

    let mut x_resolution = None;
    let mut y_resolution = None;
    let mut unit_entry = None;
    {
        let mut reader = IfdReader::open(source, &header)?;
        while let Some(entry) = reader.next_entry()? {
            match entry.tag() {
                Some(TiffTag::XResolution) => x_resolution = Some(entry),
                Some(TiffTag::YResolution) => y_resolution = Some(entry),
                Some(TiffTag::ResolutionUnit) => unit_entry = Some(entry),
                _ => {}
            }
        }
    }

    let (Some(x_entry), Some(y_entry)) = (x_resolution, y_resolution) else {
        return Ok(None);
    };

    let unit = match unit_entry {
        None => ResolutionUnit::default(),
        Some(entry) => {
            let inline_short = entry.field_type() == Some(FieldType::Short)
                && FieldType::Short.fits_inline(entry.count);
            if !inline_short {
                return Err(SniffError::malformed(
                    format,
                    format!("ResolutionUnit has datatype {}", entry.field_type),
                ));
            }
            match ResolutionUnit::from_u16(entry.value_u16(byte_order)) {
                Some(unit) => unit,
                None => return Ok(None),
            }
        }
    };

    let (x_num, x_den) = read_rational(source, &x_entry, byte_order)?;
    let (y_num, y_den) = read_rational(source, &y_entry, byte_order)?;

    let factor = match unit {
        ResolutionUnit::None | ResolutionUnit::Inch => None,
        ResolutionUnit::Centimeter => Some(DensityUnit::Centimeter),
    };

    let x_dpi = convert_ratio_to_dpi(x_num, x_den, factor)
        .ok_or_else(|| SniffError::malformed(format, "XResolution has a zero denominator"))?;
    let y_dpi = convert_ratio_to_dpi(y_num, y_den, factor)
        .ok_or_else(|| SniffError::malformed(format, "YResolution has a zero denominator"))?;

    Ok(Some(DensityReading::new(x_dpi, y_dpi)))
}

/// Read the RATIONAL an entry points at.
fn read_rational<S: ByteSource>(
    source: &mut S,
    entry: &IfdEntry,
    byte_order: ByteOrder,
) -> Result<(u32, u32), SniffError> {
    if entry.field_type() != Some(FieldType::Rational) {
        return Err(SniffError::malformed(
            ImageFormat::Tiff(byte_order),
            format!("tag {} has datatype {}, expected RATIONAL", entry.tag, entry.field_type),
        ));
    }

    let offset = entry.value_u32(byte_order);
    source.seek_to(u64::from(offset)).map_err(TiffError::from)?;
    let numerator = source.read_u32(byte_order).map_err(TiffError::from)?;
    let denominator = source.read_u32(byte_order).map_err(TiffError::from)?;
    Ok((numerator, denominator))
}

// =============================================================================
// Tests
// =============================================================================
