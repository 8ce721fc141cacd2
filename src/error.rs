use thiserror::Error;

use crate::format::ImageFormat;

/// Errors raised by a byte source while reading header bytes
#[derive(Debug, Error)]
pub enum IoError {
    /// Fewer bytes were available than the decoder asked for
    #[error("Short read: requested {requested} bytes at offset {offset}, got {available}")]
    ShortRead {
        offset: u64,
        requested: usize,
        available: usize,
    },

    /// The underlying reader or seek failed
    #[error("Stream error: {0}")]
    Stream(#[from] std::io::Error),
}

impl IoError {
    /// Whether this error means the input ended early.
    ///
    /// Truncation is a property of the header, not of the device, so the
    /// decoders report it as a malformed header of the matched format.
    pub fn is_truncation(&self) -> bool {
        match self {
            IoError::ShortRead { .. } => true,
            IoError::Stream(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
        }
    }
}

/// Errors that can occur when reading a TIFF image file directory
#[derive(Debug, Error)]
pub enum TiffError {
    /// The header or directory ended before all entries were read
    #[error("truncated directory: {0}")]
    Truncated(#[from] IoError),

    /// ImageWidth entry is neither SHORT nor LONG
    #[error("width datatype should be SHORT/LONG, got {0}")]
    WidthFieldType(u16),

    /// ImageLength entry is neither SHORT nor LONG
    #[error("height datatype should be SHORT/LONG, got {0}")]
    HeightFieldType(u16),

    /// Directory exhausted without both ImageWidth and ImageLength
    #[error("width and/or height entries are missing")]
    MissingDimensions,

    /// An entry value cannot be interpreted
    #[error("{0}")]
    Malformed(String),
}

/// Errors returned by the public sniffing operations.
///
/// An input whose signature matches no supported format is not an error;
/// the operations return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum SniffError {
    /// Opening, reading or seeking the source failed
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("invalid GIF: {0}")]
    InvalidGif(String),

    #[error("invalid PNG: {0}")]
    InvalidPng(String),

    #[error("invalid JPEG: {0}")]
    InvalidJpeg(String),

    #[error("invalid JPEG2000: {0}")]
    InvalidJpeg2000(String),

    #[error("invalid TIFF: {0}")]
    InvalidTiff(TiffError),
}

impl SniffError {
    /// Build the malformed-header error for `format`.
    pub(crate) fn malformed(format: ImageFormat, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        match format {
            ImageFormat::Gif => SniffError::InvalidGif(reason),
            ImageFormat::Png | ImageFormat::PngLegacy => SniffError::InvalidPng(reason),
            ImageFormat::Jpeg => SniffError::InvalidJpeg(reason),
            ImageFormat::Jpeg2000 => SniffError::InvalidJpeg2000(reason),
            ImageFormat::Tiff(_) => SniffError::InvalidTiff(TiffError::Malformed(reason)),
        }
    }

    /// Map a byte-source failure that happened while decoding `format`.
    pub(crate) fn from_io(format: ImageFormat, err: IoError) -> Self {
        match (format, err) {
            (_, err) if !err.is_truncation() => SniffError::from(err),
            (ImageFormat::Tiff(_), other) => SniffError::InvalidTiff(TiffError::Truncated(other)),
            (format, other) => SniffError::malformed(format, other.to_string()),
        }
    }

    /// The format whose header was malformed, if this is a decode error.
    pub fn format_name(&self) -> Option<&'static str> {
        match self {
            SniffError::Io(_) => None,
            SniffError::InvalidGif(_) => Some("GIF"),
            SniffError::InvalidPng(_) => Some("PNG"),
            SniffError::InvalidJpeg(_) => Some("JPEG"),
            SniffError::InvalidJpeg2000(_) => Some("JPEG2000"),
            SniffError::InvalidTiff(_) => Some("TIFF"),
        }
    }

    /// Whether a signature matched but its header could not be decoded.
    pub fn is_malformed_header(&self) -> bool {
        !matches!(self, SniffError::Io(_))
    }
}

impl From<TiffError> for SniffError {
    fn from(err: TiffError) -> Self {
        match err {
            TiffError::Truncated(err) if !err.is_truncation() => SniffError::from(err),
            other => SniffError::InvalidTiff(other),
        }
    }
}

/// Failures outside a format decode (opening a file, reading the
/// classification prefix) are plain I/O errors.
impl From<IoError> for SniffError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Stream(e) => SniffError::Io(e),
            short @ IoError::ShortRead { .. } => {
                SniffError::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, short))
            }
        }
    }
}

impl From<std::io::Error> for SniffError {
    fn from(err: std::io::Error) -> Self {
        SniffError::Io(err)
    }
}
