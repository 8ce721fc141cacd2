use bytes::Bytes;

use super::ByteSource;
use crate::error::IoError;

/// In-memory implementation of [`ByteSource`].
///
/// Reads hand out zero-copy slices of the underlying buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
    pos: u64,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }
}

impl ByteSource for MemorySource {
    fn read_up_to(&mut self, len: usize) -> Result<Bytes, IoError> {
        let size = self.data.len() as u64;
        let start = self.pos.min(size);
        let end = self.pos.saturating_add(len as u64).min(size);
        self.pos = self.pos.saturating_add(end - start);
        Ok(self.data.slice(start as usize..end as usize))
    }

    fn seek_to(&mut self, offset: u64) -> Result<(), IoError> {
        self.pos = offset;
        Ok(())
    }

    fn skip(&mut self, len: u64) -> Result<(), IoError> {
        self.pos = self.pos.saturating_add(len);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn identifier(&self) -> &str {
        "memory"
    }
}
