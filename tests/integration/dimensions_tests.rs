//! Dimension extraction across formats and access methods.
//!
//! Tests verify:
//! - Every supported format decodes to its true size
//! - Path, bytes and stream access agree
//! - Truncated headers of a recognized format are errors, never wrong sizes
//! - Unrecognized input is `Ok(None)`, not an error

use std::fs::File;

use imgsniff::{
    dimensions_from_bytes, dimensions_from_path, dimensions_from_stream, ImageDimensions,
    SniffError, TiffError,
};

use super::test_utils::{
    create_jp2, create_jpeg, create_tiff, create_tiff_with_entries, encoded_fixtures,
    long_entry, short_entry, synthetic_fixtures, write_temp_file, Endian, Fixture, HEIGHT, WIDTH,
};

fn assert_access_methods_agree(fixture: &Fixture) {
    let file = write_temp_file(&fixture.data);

    let from_path = dimensions_from_path(file.path())
        .unwrap_or_else(|e| panic!("{}: path read failed: {e}", fixture.name));
    let from_bytes = dimensions_from_bytes(fixture.data.clone())
        .unwrap_or_else(|e| panic!("{}: bytes read failed: {e}", fixture.name));
    let from_stream = dimensions_from_stream(File::open(file.path()).unwrap())
        .unwrap_or_else(|e| panic!("{}: stream read failed: {e}", fixture.name));

    assert_eq!(from_path, Some(fixture.expected), "{}", fixture.name);
    assert_eq!(from_bytes, from_path, "{}", fixture.name);
    assert_eq!(from_stream, from_path, "{}", fixture.name);
}

// =============================================================================
// Supported Formats
// =============================================================================

#[test]
fn test_synthetic_fixtures() {
    for fixture in synthetic_fixtures() {
        assert_access_methods_agree(&fixture);
    }
}

#[test]
fn test_encoded_fixtures() {
    for fixture in encoded_fixtures() {
        assert_access_methods_agree(&fixture);
    }
}

#[test]
fn test_large_jpeg_dimensions() {
    let (data, _) = create_jpeg(65_535, 1, (0, 1, 1));
    assert_eq!(
        dimensions_from_bytes(data).unwrap(),
        Some(ImageDimensions::new(65_535, 1))
    );
}

#[test]
fn test_tiff_big_endian_short_shifted() {
    // SHORT value stored as w << 16 in the 32-bit field
    let endian = Endian::Big;
    let width = (WIDTH << 16).to_be_bytes();
    let entries = [(256, 3, width), short_entry(endian, 257, HEIGHT as u16)];
    let data = create_tiff_with_entries(endian, &entries, &[]);

    assert_eq!(
        dimensions_from_bytes(data).unwrap(),
        Some(ImageDimensions::new(WIDTH, HEIGHT))
    );
}

#[test]
fn test_tiff_big_endian_long() {
    let endian = Endian::Big;
    let entries = [long_entry(endian, 257, 70_000), long_entry(endian, 256, 90_000)];
    let data = create_tiff_with_entries(endian, &entries, &[]);

    assert_eq!(
        dimensions_from_bytes(data).unwrap(),
        Some(ImageDimensions::new(90_000, 70_000))
    );
}

// =============================================================================
// Malformed Headers
// =============================================================================

#[test]
fn test_truncated_jpeg() {
    let (data, fields_end) = create_jpeg(WIDTH as u16, HEIGHT as u16, (0, 1, 1));

    for len in 2..fields_end {
        let err = dimensions_from_bytes(data[..len].to_vec()).unwrap_err();
        assert!(
            matches!(err, SniffError::InvalidJpeg(_)),
            "length {len}: {err:?}"
        );
    }

    // Width is the last field read
    assert!(dimensions_from_bytes(data[..fields_end].to_vec()).is_ok());
}

#[test]
fn test_jpeg_without_frame() {
    let data = vec![0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02, 0xFF, 0xD9];
    let err = dimensions_from_bytes(data).unwrap_err();
    assert!(matches!(err, SniffError::InvalidJpeg(_)));
    assert_eq!(err.format_name(), Some("JPEG"));
}

#[test]
fn test_truncated_jpeg2000() {
    let data = create_jp2(WIDTH, HEIGHT, &[]);

    for len in 12..56 {
        let err = dimensions_from_bytes(data[..len].to_vec()).unwrap_err();
        assert!(
            matches!(err, SniffError::InvalidJpeg2000(_)),
            "length {len}: {err:?}"
        );
    }
}

#[test]
fn test_truncated_tiff() {
    for endian in [Endian::Big, Endian::Little] {
        let data = create_tiff(endian, WIDTH, HEIGHT);
        // Header, count, then the entry before width plus width and height
        let needed = 8 + 2 + 3 * 12;

        for len in 8..needed {
            let err = dimensions_from_bytes(data[..len].to_vec()).unwrap_err();
            assert!(
                matches!(err, SniffError::InvalidTiff(TiffError::Truncated(_))),
                "{endian:?} length {len}: {err:?}"
            );
        }
    }
}

#[test]
fn test_tiff_bad_datatype() {
    let endian = Endian::Big;
    let entries = [(256, 2, *b"802\0"), short_entry(endian, 257, 670)];
    let data = create_tiff_with_entries(endian, &entries, &[]);

    let err = dimensions_from_bytes(data).unwrap_err();
    assert!(matches!(
        err,
        SniffError::InvalidTiff(TiffError::WidthFieldType(2))
    ));
    assert!(err.is_malformed_header());
}

#[test]
fn test_tiff_missing_entries() {
    let endian = Endian::Little;
    let entries = [short_entry(endian, 257, 600), short_entry(endian, 258, 8)];
    let data = create_tiff_with_entries(endian, &entries, &[]);

    let err = dimensions_from_bytes(data).unwrap_err();
    assert!(matches!(
        err,
        SniffError::InvalidTiff(TiffError::MissingDimensions)
    ));
}

// =============================================================================
// Unrecognized Input
// =============================================================================

#[test]
fn test_unknown_formats() {
    let inputs: [&[u8]; 6] = [
        b"",
        b"hello world, this is plain text",
        b"BM\x36\x00\x0c\x00\x00\x00\x00\x00\x36\x00",
        b"RIFF\x24\x00\x00\x00WEBPVP8 ",
        b"GIF89a\x01",
        b"II\x2b\x00\x08\x00\x00\x00\x10\x00\x00\x00",
    ];

    for input in inputs {
        assert_eq!(dimensions_from_bytes(input.to_vec()).unwrap(), None);
    }
}

#[test]
fn test_unknown_format_from_path() {
    let file = write_temp_file(b"#!/bin/sh\necho not an image\n");
    assert_eq!(dimensions_from_path(file.path()).unwrap(), None);
}
