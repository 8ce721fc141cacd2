//! Byte source and format classification tests.
//!
//! Tests verify:
//! - Stream offsets are relative to the position the stream was handed over at
//! - Borrowed streams stay usable and owned files are released
//! - Open failures surface as I/O errors
//! - Custom `ByteSource` implementations plug into the generic entry points

use std::fs::File;
use std::io::{Cursor, Seek, SeekFrom};

use bytes::Bytes;

use imgsniff::{
    density_from_stream, dimensions_from_path, dimensions_from_source, dimensions_from_stream,
    format_from_bytes, format_from_path, format_from_stream, ByteOrder, ByteSource,
    DensityReading, ImageDimensions, ImageFormat, IoError, MemorySource, SniffError,
};

use super::test_utils::{
    create_jp2, create_png, create_tiff, jp2_resolution, synthetic_fixtures, write_temp_file,
    Endian, HEIGHT, WIDTH,
};

// =============================================================================
// Format Classification
// =============================================================================

#[test]
fn test_format_from_all_access_methods() {
    let expected = [
        ImageFormat::Gif,
        ImageFormat::Png,
        ImageFormat::PngLegacy,
        ImageFormat::Jpeg,
        ImageFormat::Jpeg2000,
        ImageFormat::Tiff(ByteOrder::BigEndian),
        ImageFormat::Tiff(ByteOrder::LittleEndian),
    ];

    for (fixture, format) in synthetic_fixtures().into_iter().zip(expected) {
        let file = write_temp_file(&fixture.data);

        assert_eq!(format_from_path(file.path()).unwrap(), Some(format), "{}", fixture.name);
        assert_eq!(
            format_from_bytes(fixture.data.clone()).unwrap(),
            Some(format),
            "{}",
            fixture.name
        );
        assert_eq!(
            format_from_stream(Cursor::new(fixture.data)).unwrap(),
            Some(format),
            "{}",
            fixture.name
        );
    }
}

// =============================================================================
// Streams
// =============================================================================

#[test]
fn test_stream_with_leading_bytes() {
    let mut data = vec![0xAA; 100];
    data.extend_from_slice(&create_jp2(WIDTH, HEIGHT, &[jp2_resolution(
        b"resd",
        (2835, 1, 0),
        (2835, 1, 0),
    )]));

    let mut cursor = Cursor::new(data);
    cursor.seek(SeekFrom::Start(100)).unwrap();
    assert_eq!(
        dimensions_from_stream(&mut cursor).unwrap(),
        Some(ImageDimensions::new(WIDTH, HEIGHT))
    );

    // The borrowed stream is still ours to reposition
    cursor.seek(SeekFrom::Start(100)).unwrap();
    assert_eq!(
        density_from_stream(&mut cursor).unwrap(),
        Some(DensityReading::new(72, 72))
    );
}

#[test]
fn test_file_stream_reused() {
    let file = write_temp_file(&create_tiff(Endian::Big, WIDTH, HEIGHT));
    let mut handle = File::open(file.path()).unwrap();

    for _ in 0..3 {
        handle.rewind().unwrap();
        assert_eq!(
            dimensions_from_stream(&mut handle).unwrap(),
            Some(ImageDimensions::new(WIDTH, HEIGHT))
        );
    }
}

#[test]
fn test_repeated_path_reads() {
    // Each call opens and closes its own handle
    let file = write_temp_file(&create_png(WIDTH, HEIGHT, None));
    for _ in 0..256 {
        assert_eq!(
            dimensions_from_path(file.path()).unwrap(),
            Some(ImageDimensions::new(WIDTH, HEIGHT))
        );
    }
}

// =============================================================================
// I/O Failures
// =============================================================================

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png");

    let err = dimensions_from_path(&missing).unwrap_err();
    match &err {
        SniffError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected Io, got {other:?}"),
    }
    assert!(!err.is_malformed_header());
    assert_eq!(err.format_name(), None);
}

#[test]
fn test_directory_is_not_an_image() {
    let dir = tempfile::tempdir().unwrap();
    let result = dimensions_from_path(dir.path());
    assert!(matches!(result, Err(SniffError::Io(_))));
}

/// A source that fails every read after the first `budget` bytes.
struct FailingSource {
    inner: MemorySource,
    budget: u64,
}

impl ByteSource for FailingSource {
    fn read_up_to(&mut self, len: usize) -> Result<Bytes, IoError> {
        if self.inner.position() + len as u64 > self.budget {
            return Err(IoError::Stream(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "device went away",
            )));
        }
        self.inner.read_up_to(len)
    }

    fn seek_to(&mut self, offset: u64) -> Result<(), IoError> {
        self.inner.seek_to(offset)
    }

    fn skip(&mut self, len: u64) -> Result<(), IoError> {
        self.inner.skip(len)
    }

    fn position(&self) -> u64 {
        self.inner.position()
    }

    fn identifier(&self) -> &str {
        "failing"
    }
}

#[test]
fn test_device_errors_are_not_format_errors() {
    let data = create_tiff(Endian::Little, WIDTH, HEIGHT);
    let source = FailingSource {
        inner: MemorySource::new(data),
        budget: 24,
    };

    let err = dimensions_from_source(source).unwrap_err();
    match err {
        SniffError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::ConnectionReset),
        other => panic!("expected Io, got {other:?}"),
    }
}

#[test]
fn test_custom_source() {
    let data = create_png(WIDTH, HEIGHT, None);
    let source = FailingSource {
        inner: MemorySource::new(data),
        budget: u64::MAX,
    };
    assert_eq!(
        dimensions_from_source(source).unwrap(),
        Some(ImageDimensions::new(WIDTH, HEIGHT))
    );
}
