//! # imgsniff
//!
//! Read image width, height and resolution from header bytes alone.
//!
//! The crate looks at the first few bytes of an image to recognize its
//! container, then reads only the structures that hold the fields it needs
//! (a fixed prefix for GIF and PNG, a segment, box or directory walk for
//! JPEG, JPEG 2000 and TIFF). Pixel data is never decoded.
//!
//! ## Supported formats
//!
//! - GIF (87a and 89a)
//! - PNG, including a legacy layout without an IHDR chunk
//! - JPEG (baseline, progressive, lossless and arithmetic frames)
//! - JPEG 2000 (JP2 file format)
//! - TIFF, big- and little-endian
//!
//! ## Architecture
//!
//! - [`io`] - Byte sources over files, streams and memory
//! - [`mod@format`] - Signature matching and per-format decoders
//! - [`units`] - Density unit conversion to dots per inch
//! - [`probe`] - Public entry points
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use imgsniff::{density_from_path, dimensions_from_path};
//!
//! fn main() -> Result<(), imgsniff::SniffError> {
//!     match dimensions_from_path("photo.jpg")? {
//!         Some(dims) => println!("{} x {}", dims.width, dims.height),
//!         None => println!("not a supported image"),
//!     }
//!
//!     if let Some(dpi) = density_from_path("photo.jpg")? {
//!         println!("{} x {} dpi", dpi.x_dpi, dpi.y_dpi);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod probe;
pub mod units;

// Re-export commonly used types
pub use error::{IoError, SniffError, TiffError};
pub use format::{detect_format, ImageFormat, HEADER_PROBE_LEN};
pub use io::{ByteOrder, ByteSource, MemorySource, StreamSource};
pub use probe::{
    density_from_bytes, density_from_path, density_from_source, density_from_stream,
    dimensions_from_bytes, dimensions_from_path, dimensions_from_source, dimensions_from_stream,
    format_from_bytes, format_from_path, format_from_source, format_from_stream, DensityReading,
    ImageDimensions,
};
pub use units::{convert_exponent_to_dpi, convert_ratio_to_dpi, convert_to_dpi, DensityUnit};
