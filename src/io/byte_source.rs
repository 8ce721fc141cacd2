use bytes::Bytes;

use super::ByteOrder;
use crate::error::IoError;

/// Trait for reading header bytes from a seekable source.
///
/// This abstraction lets the format decoders work the same way over files,
/// caller-supplied streams and in-memory buffers. Offsets passed to
/// [`seek_to`](ByteSource::seek_to) are relative to the source's origin,
/// which for a wrapped stream is the position it had when it was wrapped.
pub trait ByteSource {
    /// Read up to `len` bytes from the current position.
    ///
    /// Returns fewer bytes only when the input ends first.
    fn read_up_to(&mut self, len: usize) -> Result<Bytes, IoError>;

    /// Move to an absolute offset from the origin.
    ///
    /// Seeking past the end is allowed; the next read comes back short.
    fn seek_to(&mut self, offset: u64) -> Result<(), IoError>;

    /// Move forward `len` bytes from the current position.
    fn skip(&mut self, len: u64) -> Result<(), IoError>;

    /// Current offset from the origin.
    fn position(&self) -> u64;

    /// Get a unique identifier for this source (for logging).
    fn identifier(&self) -> &str;

    /// Read exactly `len` bytes, failing with [`IoError::ShortRead`] if the
    /// input ends first.
    fn read_exact_bytes(&mut self, len: usize) -> Result<Bytes, IoError> {
        let offset = self.position();
        let bytes = self.read_up_to(len)?;
        if bytes.len() < len {
            return Err(IoError::ShortRead {
                offset,
                requested: len,
                available: bytes.len(),
            });
        }
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8, IoError> {
        Ok(self.read_exact_bytes(1)?[0])
    }

    fn read_u16(&mut self, order: ByteOrder) -> Result<u16, IoError> {
        let bytes = self.read_exact_bytes(2)?;
        Ok(order.read_u16(&bytes))
    }

    fn read_u32(&mut self, order: ByteOrder) -> Result<u32, IoError> {
        let bytes = self.read_exact_bytes(4)?;
        Ok(order.read_u32(&bytes))
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_up_to(&mut self, len: usize) -> Result<Bytes, IoError> {
        (**self).read_up_to(len)
    }

    fn seek_to(&mut self, offset: u64) -> Result<(), IoError> {
        (**self).seek_to(offset)
    }

    fn skip(&mut self, len: u64) -> Result<(), IoError> {
        (**self).skip(len)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn identifier(&self) -> &str {
        (**self).identifier()
    }
}
