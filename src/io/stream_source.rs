use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};

use super::ByteSource;
use crate::error::IoError;

/// Forward skips up to this length are read through instead of sought, so a
/// buffered reader keeps its buffer.
const READ_THROUGH_SKIP_LEN: u64 = 4096;

/// [`ByteSource`] over any `Read + Seek` stream.
///
/// Wraps files opened from a path as well as streams supplied by the caller.
/// Passing `&mut stream` leaves ownership (and closing) with the caller; a
/// source built with [`StreamSource::open`] owns its file and closes it when
/// dropped.
#[derive(Debug)]
pub struct StreamSource<R> {
    inner: R,
    origin: u64,
    pos: u64,
    identifier: String,
}

impl StreamSource<BufReader<File>> {
    /// Open a file for header reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut source = Self::new(BufReader::new(file))?;
        source.identifier = path.display().to_string();
        Ok(source)
    }
}

impl<R: Read + Seek> StreamSource<R> {
    /// Wrap a stream, taking its current position as the origin.
    pub fn new(mut inner: R) -> Result<Self, IoError> {
        let origin = inner.stream_position()?;
        Ok(Self {
            inner,
            origin,
            pos: 0,
            identifier: "stream".to_string(),
        })
    }
}

impl<R: Read + Seek> ByteSource for StreamSource<R> {
    fn read_up_to(&mut self, len: usize) -> Result<Bytes, IoError> {
        let mut buf = BytesMut::with_capacity(len).writer();
        let read = std::io::copy(&mut (&mut self.inner).take(len as u64), &mut buf)?;
        self.pos += read;
        Ok(buf.into_inner().freeze())
    }

    fn seek_to(&mut self, offset: u64) -> Result<(), IoError> {
        if offset == self.pos {
            return Ok(());
        }
        let absolute = self.origin.saturating_add(offset);
        self.inner.seek(SeekFrom::Start(absolute))?;
        self.pos = offset;
        Ok(())
    }

    fn skip(&mut self, len: u64) -> Result<(), IoError> {
        let target = self.pos.saturating_add(len);
        if len <= READ_THROUGH_SKIP_LEN {
            let skipped = std::io::copy(&mut (&mut self.inner).take(len), &mut std::io::sink())?;
            self.pos += skipped;
        }
        // Seeks only for long skips or when the stream ended first
        self.seek_to(target)
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
