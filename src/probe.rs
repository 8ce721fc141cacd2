//! Public entry points.
//!
//! Every operation comes in three flavours that differ only in where the
//! bytes come from: a filesystem path, an in-memory buffer, or a caller's
//! seekable stream. All of them classify the input once from its first
//! [`HEADER_PROBE_LEN`] bytes and dispatch to the matching decoder.
//!
//! `Ok(None)` means the input matched no supported signature (or, for
//! density, that the header carries no density metadata). A matched
//! signature whose fields cannot be decoded is an error.

use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::error::SniffError;
use crate::format::{detect_format, gif, jpeg, jpeg2000, png, tiff, ImageFormat, HEADER_PROBE_LEN};
use crate::io::{ByteSource, MemorySource, StreamSource};

// =============================================================================
// Results
// =============================================================================

/// Pixel width and height of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Horizontal and vertical density in dots per inch.
///
/// When the header gives only an aspect ratio (no physical unit) the raw
/// values are reported unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DensityReading {
    pub x_dpi: u32,
    pub y_dpi: u32,
}

impl DensityReading {
    pub const fn new(x_dpi: u32, y_dpi: u32) -> Self {
        Self { x_dpi, y_dpi }
    }
}

impl fmt::Display for DensityReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} dpi", self.x_dpi, self.y_dpi)
    }
}

// =============================================================================
// Generic Operations
// =============================================================================

/// Read the classification prefix from the start of the source.
fn read_head<S: ByteSource>(source: &mut S) -> Result<Bytes, SniffError> {
    source.seek_to(0)?;
    Ok(source.read_up_to(HEADER_PROBE_LEN)?)
}

/// Classify a source without decoding any fields.
pub fn format_from_source<S: ByteSource>(mut source: S) -> Result<Option<ImageFormat>, SniffError> {
    let head = read_head(&mut source)?;
    Ok(detect_format(&head))
}

/// Read width and height from any [`ByteSource`].
pub fn dimensions_from_source<S: ByteSource>(
    mut source: S,
) -> Result<Option<ImageDimensions>, SniffError> {
    let head = read_head(&mut source)?;
    let Some(format) = detect_format(&head) else {
        return Ok(None);
    };

    let dimensions = match format {
        ImageFormat::Gif => gif::dimensions(&head)?,
        ImageFormat::Png | ImageFormat::PngLegacy => png::dimensions(format, &head)?,
        ImageFormat::Jpeg => jpeg::dimensions(&mut source)?,
        ImageFormat::Jpeg2000 => jpeg2000::dimensions(&mut source)?,
        ImageFormat::Tiff(byte_order) => tiff::dimensions(&mut source, byte_order, &head)?,
    };

    debug!(
        source = source.identifier(),
        format = format.name(),
        width = dimensions.width,
        height = dimensions.height,
        "Read image dimensions"
    );
    Ok(Some(dimensions))
}

/// Read density in dots per inch from any [`ByteSource`].
///
/// GIF carries no density, so it always gives `None`.
pub fn density_from_source<S: ByteSource>(
    mut source: S,
) -> Result<Option<DensityReading>, SniffError> {
    let head = read_head(&mut source)?;
    let Some(format) = detect_format(&head) else {
        return Ok(None);
    };

    let density = match format {
        ImageFormat::Gif => None,
        ImageFormat::Png | ImageFormat::PngLegacy => png::density(&mut source)?,
        ImageFormat::Jpeg => jpeg::density(&mut source)?,
        ImageFormat::Jpeg2000 => jpeg2000::density(&mut source)?,
        ImageFormat::Tiff(byte_order) => tiff::density(&mut source, byte_order, &head)?,
    };

    debug!(
        source = source.identifier(),
        format = format.name(),
        found = density.is_some(),
        "Read image density"
    );
    Ok(density)
}

// =============================================================================
// Path, Bytes and Stream Flavours
// =============================================================================

/// Classify the file at `path`.
pub fn format_from_path(path: impl AsRef<Path>) -> Result<Option<ImageFormat>, SniffError> {
    format_from_source(StreamSource::open(path)?)
}

/// Classify an in-memory image.
pub fn format_from_bytes(contents: impl Into<Bytes>) -> Result<Option<ImageFormat>, SniffError> {
    format_from_source(MemorySource::new(contents))
}

/// Classify a seekable stream starting at its current position.
pub fn format_from_stream<R: Read + Seek>(stream: R) -> Result<Option<ImageFormat>, SniffError> {
    format_from_source(StreamSource::new(stream)?)
}

/// Read width and height of the file at `path`.
///
/// The file is closed before returning, on success or failure.
pub fn dimensions_from_path(path: impl AsRef<Path>) -> Result<Option<ImageDimensions>, SniffError> {
    dimensions_from_source(StreamSource::open(path)?)
}

/// Read width and height of an in-memory image.
pub fn dimensions_from_bytes(
    contents: impl Into<Bytes>,
) -> Result<Option<ImageDimensions>, SniffError> {
    dimensions_from_source(MemorySource::new(contents))
}

/// Read width and height from a seekable stream.
///
/// Offsets inside the image are taken relative to the stream's position
/// when it is passed in. Pass `&mut stream` to keep using the stream
/// afterwards; it is left positioned somewhere inside the header.
pub fn dimensions_from_stream<R: Read + Seek>(
    stream: R,
) -> Result<Option<ImageDimensions>, SniffError> {
    dimensions_from_source(StreamSource::new(stream)?)
}

/// Read density of the file at `path`.
pub fn density_from_path(path: impl AsRef<Path>) -> Result<Option<DensityReading>, SniffError> {
    density_from_source(StreamSource::open(path)?)
}

/// Read density of an in-memory image.
pub fn density_from_bytes(contents: impl Into<Bytes>) -> Result<Option<DensityReading>, SniffError> {
    density_from_source(MemorySource::new(contents))
}

/// Read density from a seekable stream.
pub fn density_from_stream<R: Read + Seek>(stream: R) -> Result<Option<DensityReading>, SniffError> {
    density_from_source(StreamSource::new(stream)?)
}

// =============================================================================
// Tests
// =============================================================================
