//! JP2 box structure.
//!
//! A JP2 file is a sequence of boxes:
//!
//! ```text
//! LBox: u32 BE   total box length (1 = XLBox follows, 0 = to end of file)
//! TBox: [u8; 4]  box type
//! XLBox: u64 BE  only when LBox == 1
//! ```
//!
//! The files this crate recognizes start with the 12-byte signature box
//! followed by a 20-byte `ftyp` box, which puts the JP2 header superbox
//! (`jp2h`) at offset 32 and its first child, the image header box
//! (`ihdr`), at 40. The `ihdr` payload starts with `height: u32, width: u32`
//! at offset 48.
//!
//! Resolution lives in the optional `res ` superbox inside `jp2h`, as a
//! display (`resd`) or capture (`resc`) resolution box:
//!
//! ```text
//! VR_N u16, VR_D u16, HR_N u16, HR_D u16, VR_E i8, HR_E i8
//! ```
//!
//! giving `N / D * 10^E` grid points per meter vertically and horizontally.

use tracing::trace;

use crate::error::{IoError, SniffError};
use crate::format::detect::JP2_SIGNATURE;
use crate::format::ImageFormat;
use crate::io::{read_u16_be, read_u64_be, ByteOrder, ByteSource};
use crate::probe::{DensityReading, ImageDimensions};
use crate::units::{convert_ratio_to_dpi, DensityUnit};

/// Offset of the `ihdr` height and width fields.
const IHDR_FIELDS_OFFSET: u64 = 48;

const BOX_JP2_HEADER: &[u8; 4] = b"jp2h";
const BOX_RESOLUTION: &[u8; 4] = b"res ";
const BOX_DISPLAY_RESOLUTION: &[u8; 4] = b"resd";
const BOX_CAPTURE_RESOLUTION: &[u8; 4] = b"resc";

/// Largest box end a seekable stream can address.
const MAX_BOX_END: u64 = i64::MAX as u64;

/// Payload length of `resc` and `resd`.
const RESOLUTION_BOX_LEN: usize = 10;

fn invalid(err: IoError) -> SniffError {
    SniffError::from_io(ImageFormat::Jpeg2000, err)
}

fn malformed(reason: impl Into<String>) -> SniffError {
    SniffError::malformed(ImageFormat::Jpeg2000, reason)
}

/// Read height and width from the `ihdr` box at its fixed offset.
pub fn dimensions<S: ByteSource>(source: &mut S) -> Result<ImageDimensions, SniffError> {
    source.seek_to(IHDR_FIELDS_OFFSET).map_err(invalid)?;
    let height = source.read_u32(ByteOrder::BigEndian).map_err(invalid)?;
    let width = source.read_u32(ByteOrder::BigEndian).map_err(invalid)?;
    Ok(ImageDimensions::new(width, height))
}

// =============================================================================
// Box Walking
// =============================================================================

/// A box header; the source sits at the start of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoxHeader {
    box_type: [u8; 4],
    /// Offset just past the box, `None` when it runs to the end of input
    end: Option<u64>,
}

/// Read the box header at the current position.
///
/// Returns `None` at a clean end of input.
fn read_box_header<S: ByteSource>(source: &mut S) -> Result<Option<BoxHeader>, SniffError> {
    let start = source.position();
    let head = source.read_up_to(8).map_err(invalid)?;
    if head.is_empty() {
        return Ok(None);
    }
    if head.len() < 8 {
        return Err(malformed(format!("box header at offset {start} is truncated")));
    }

    let length = u64::from(ByteOrder::BigEndian.read_u32(&head[0..4]));
    let mut box_type = [0u8; 4];
    box_type.copy_from_slice(&head[4..8]);

    let end = match length {
        0 => None,
        1 => {
            let extended = source.read_exact_bytes(8).map_err(invalid)?;
            let length = read_u64_be(&extended);
            if length < 16 {
                return Err(malformed(format!("box length {length} at offset {start}")));
            }
            Some(start.saturating_add(length))
        }
        2..=7 => return Err(malformed(format!("box length {length} at offset {start}"))),
        _ => Some(start + length),
    };

    if end.is_some_and(|end| end > MAX_BOX_END) {
        return Err(malformed(format!("box at offset {start} extends past any input")));
    }

    trace!(
        box_type = %String::from_utf8_lossy(&box_type),
        start,
        ?end,
        "JP2 box"
    );
    Ok(Some(BoxHeader { box_type, end }))
}

/// Find the first box of type `wanted` between the current position and
/// `parent_end`, leaving the source at its payload.
fn find_box<S: ByteSource>(
    source: &mut S,
    parent_end: Option<u64>,
    wanted: &[u8; 4],
) -> Result<Option<BoxHeader>, SniffError> {
    loop {
        if parent_end.is_some_and(|end| source.position() >= end) {
            return Ok(None);
        }

        let Some(header) = read_box_header(source)? else {
            return parent_cut_short(parent_end).map(|()| None);
        };

        check_nested(&header, parent_end)?;

        if &header.box_type == wanted {
            return Ok(Some(header));
        }

        match header.end {
            Some(end) => skip_to_box_end(source, end)?,
            // Runs to end of input; nothing follows it
            None => return Ok(None),
        }
    }
}

/// Move past a box whose payload is not needed.
///
/// The last byte of the box has to exist, so a box claiming more bytes
/// than the input holds is malformed whatever the source type.
fn skip_to_box_end<S: ByteSource>(source: &mut S, end: u64) -> Result<(), SniffError> {
    let out_of_range = || malformed(format!("box end at offset {end} is past the end of input"));

    match source.seek_to(end - 1) {
        Ok(()) => {}
        // Offsets a file system cannot address
        Err(IoError::Stream(e)) if e.kind() == std::io::ErrorKind::InvalidInput => {
            return Err(out_of_range())
        }
        Err(e) => return Err(invalid(e)),
    }

    if source.read_up_to(1).map_err(invalid)?.is_empty() {
        return Err(out_of_range());
    }
    Ok(())
}

/// Reject input that ends inside a parent box with a declared length.
///
/// Only called once the input has run out before `parent_end` was reached.
fn parent_cut_short(parent_end: Option<u64>) -> Result<(), SniffError> {
    match parent_end {
        Some(end) => Err(malformed(format!("input ends before box end at offset {end}"))),
        None => Ok(()),
    }
}

/// Reject a child box that extends past its parent.
fn check_nested(header: &BoxHeader, parent_end: Option<u64>) -> Result<(), SniffError> {
    match (header.end, parent_end) {
        (Some(child_end), Some(parent_end)) if child_end > parent_end => Err(malformed(format!(
            "box {} overruns its parent",
            String::from_utf8_lossy(&header.box_type)
        ))),
        _ => Ok(()),
    }
}

// =============================================================================
// Density
// =============================================================================

/// Read the display resolution, falling back to the capture resolution.
///
/// Returns `None` when the header has no resolution boxes.
pub fn density<S: ByteSource>(source: &mut S) -> Result<Option<DensityReading>, SniffError> {
    source.seek_to(JP2_SIGNATURE.len() as u64).map_err(invalid)?;

    let Some(jp2h) = find_box(source, None, BOX_JP2_HEADER)? else {
        return Ok(None);
    };
    let Some(res) = find_box(source, jp2h.end, BOX_RESOLUTION)? else {
        return Ok(None);
    };

    let mut capture = None;
    loop {
        if res.end.is_some_and(|end| source.position() >= end) {
            break;
        }
        let Some(child) = read_box_header(source)? else {
            parent_cut_short(res.end)?;
            break;
        };
        check_nested(&child, res.end)?;

        if &child.box_type == BOX_DISPLAY_RESOLUTION {
            let payload = source.read_exact_bytes(RESOLUTION_BOX_LEN).map_err(invalid)?;
            return resolution_to_dpi(&payload).map(Some);
        }

        if &child.box_type == BOX_CAPTURE_RESOLUTION && capture.is_none() {
            capture = Some(source.read_exact_bytes(RESOLUTION_BOX_LEN).map_err(invalid)?);
        }

        match child.end {
            Some(end) => skip_to_box_end(source, end)?,
            None => break,
        }
    }

    capture.map(|payload| resolution_to_dpi(&payload)).transpose()
}

/// Decode a `resc`/`resd` payload into dots per inch.
fn resolution_to_dpi(payload: &[u8]) -> Result<DensityReading, SniffError> {
    let vertical_num = read_u16_be(&payload[0..2]);
    let vertical_den = read_u16_be(&payload[2..4]);
    let horizontal_num = read_u16_be(&payload[4..6]);
    let horizontal_den = read_u16_be(&payload[6..8]);
    let vertical_exp = payload[8] as i8;
    let horizontal_exp = payload[9] as i8;

    let axis = |num: u16, den: u16, exponent: i8| {
        convert_ratio_to_dpi(
            u32::from(num),
            u32::from(den),
            DensityUnit::from_exponent(exponent),
        )
        .ok_or_else(|| malformed("resolution box has a zero denominator"))
    };

    let y_dpi = axis(vertical_num, vertical_den, vertical_exp)?;
    let x_dpi = axis(horizontal_num, horizontal_den, horizontal_exp)?;
    Ok(DensityReading::new(x_dpi, y_dpi))
}

// =============================================================================
// Tests
// =============================================================================
