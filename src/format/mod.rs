//! Header decoders for the supported image containers.
//!
//! Use [`detect_format`] to classify an input from its first
//! [`HEADER_PROBE_LEN`] bytes, then the per-format module to decode its
//! fields. Supported formats:
//!
//! - **GIF**: logical screen descriptor
//! - **PNG**: IHDR (or the legacy layout) and the pHYs chunk
//! - **JPEG**: first Start Of Frame segment and JFIF APP0
//! - **JPEG 2000**: JP2 image header and resolution boxes
//! - **TIFF**: first image file directory, either byte order

pub mod detect;
pub mod gif;
pub mod jpeg;
pub mod jpeg2000;
pub mod png;
pub mod tiff;

pub use detect::{detect_format, ImageFormat, HEADER_PROBE_LEN};
