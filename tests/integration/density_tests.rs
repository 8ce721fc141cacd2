//! Density extraction tests.
//!
//! Tests verify:
//! - Each format's density metadata converts to dots per inch
//! - Missing density metadata is `Ok(None)`
//! - Truncated density structures are format errors

use std::io::Cursor;

use imgsniff::{
    density_from_bytes, density_from_path, density_from_stream, DensityReading, SniffError,
    TiffError,
};

use super::test_utils::{
    create_gif, create_jp2, create_jpeg, create_png, create_tiff, create_tiff_with_resolution,
    encode_jpeg_with_dpi, jp2_resolution, write_temp_file, Endian, HEIGHT, JP2_SIGNATURE,
    WIDTH,
};

// =============================================================================
// PNG
// =============================================================================

#[test]
fn test_png_phys_meters() {
    let data = create_png(WIDTH, HEIGHT, Some((11811, 3780, 1)));
    assert_eq!(
        density_from_bytes(data).unwrap(),
        Some(DensityReading::new(300, 96))
    );
}

#[test]
fn test_png_phys_aspect_ratio() {
    let data = create_png(WIDTH, HEIGHT, Some((2, 1, 0)));
    assert_eq!(
        density_from_bytes(data).unwrap(),
        Some(DensityReading::new(2, 1))
    );
}

#[test]
fn test_png_without_phys() {
    let data = create_png(WIDTH, HEIGHT, None);
    assert_eq!(density_from_bytes(data).unwrap(), None);
}

#[test]
fn test_png_truncated_chunks() {
    let data = create_png(WIDTH, HEIGHT, Some((2835, 2835, 1)));
    // Cut inside the pHYs chunk
    let phys_start = 8 + 25 + 16;
    for len in [24, 40, phys_start + 4, phys_start + 12] {
        let err = density_from_bytes(data[..len].to_vec()).unwrap_err();
        assert!(matches!(err, SniffError::InvalidPng(_)), "length {len}: {err:?}");
    }
}

// =============================================================================
// JPEG
// =============================================================================

#[test]
fn test_jpeg_jfif_units() {
    let cases = [
        ((1, 300, 150), Some(DensityReading::new(300, 150))),
        ((0, 1, 1), Some(DensityReading::new(1, 1))),
        // 118 dots/cm ~= 300 dpi
        ((2, 118, 28), Some(DensityReading::new(300, 71))),
        ((3, 72, 72), None),
    ];

    for (app0, expected) in cases {
        let (data, _) = create_jpeg(16, 16, app0);
        assert_eq!(density_from_bytes(data).unwrap(), expected, "{app0:?}");
    }
}

#[test]
fn test_jpeg_without_app0() {
    let data = vec![
        0xFF, 0xD8, // SOI
        0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x10, 0x00, 0x10, 0x01, 0x01, 0x11, 0x00,
    ];
    assert_eq!(density_from_bytes(data).unwrap(), None);
}

#[test]
fn test_encoded_jpeg_dpi() {
    let data = encode_jpeg_with_dpi(64, 48, 300);
    let file = write_temp_file(&data);

    assert_eq!(
        density_from_path(file.path()).unwrap(),
        Some(DensityReading::new(300, 300))
    );
    assert_eq!(
        density_from_bytes(data).unwrap(),
        Some(DensityReading::new(300, 300))
    );
}

// =============================================================================
// JPEG 2000
// =============================================================================

#[test]
fn test_jp2_display_resolution() {
    let res = jp2_resolution(b"resd", (11811, 1, 0), (2835, 1, 0));
    let data = create_jp2(WIDTH, HEIGHT, &[res]);
    assert_eq!(
        density_from_bytes(data).unwrap(),
        Some(DensityReading::new(72, 300))
    );
}

#[test]
fn test_jp2_capture_fallback() {
    let res = jp2_resolution(b"resc", (3, 1, 2), (3, 1, 2));
    let data = create_jp2(WIDTH, HEIGHT, &[res]);
    assert_eq!(
        density_from_bytes(data).unwrap(),
        Some(DensityReading::new(8, 8))
    );
}

#[test]
fn test_jp2_display_preferred() {
    let capture = jp2_resolution(b"resc", (11811, 1, 0), (11811, 1, 0));
    let display = jp2_resolution(b"resd", (2835, 1, 0), (2835, 1, 0));
    let data = create_jp2(WIDTH, HEIGHT, &[capture, display]);
    assert_eq!(
        density_from_bytes(data).unwrap(),
        Some(DensityReading::new(72, 72))
    );
}

#[test]
fn test_jp2_without_resolution() {
    let data = create_jp2(WIDTH, HEIGHT, &[]);
    assert_eq!(density_from_bytes(data).unwrap(), None);
}

#[test]
fn test_jp2_zero_denominator() {
    let res = jp2_resolution(b"resd", (72, 0, 0), (72, 1, 0));
    let data = create_jp2(WIDTH, HEIGHT, &[res]);
    let err = density_from_bytes(data).unwrap_err();
    assert!(matches!(err, SniffError::InvalidJpeg2000(_)));
}

#[test]
fn test_jp2_huge_box_length_same_for_every_source() {
    let mut data = JP2_SIGNATURE.to_vec();
    data.extend_from_slice(&[0, 0, 0, 1]);
    data.extend_from_slice(b"ftyp");
    data.extend_from_slice(&0xFFFF_FFFF_FFFF_FFF0u64.to_be_bytes());
    data.extend_from_slice(b"jp2 \0\0\0\0jp2 ");
    let file = write_temp_file(&data);

    let from_path = density_from_path(file.path()).unwrap_err();
    let from_bytes = density_from_bytes(data.clone()).unwrap_err();
    let from_stream = density_from_stream(Cursor::new(data)).unwrap_err();
    for err in [from_path, from_bytes, from_stream] {
        assert!(matches!(err, SniffError::InvalidJpeg2000(_)), "{err:?}");
    }
}

#[test]
fn test_jp2_header_box_cut_short() {
    let data = create_jp2(WIDTH, HEIGHT, &[]);
    // Drop jp2c and the tail of colr so jp2h ends early
    let header_end = 32 + u32::from_be_bytes([data[32], data[33], data[34], data[35]]) as usize;
    let data = data[..header_end - 4].to_vec();
    let file = write_temp_file(&data);

    assert!(matches!(
        density_from_bytes(data).unwrap_err(),
        SniffError::InvalidJpeg2000(_)
    ));
    assert!(matches!(
        density_from_path(file.path()).unwrap_err(),
        SniffError::InvalidJpeg2000(_)
    ));
}

// =============================================================================
// TIFF
// =============================================================================

#[test]
fn test_tiff_resolution_inch() {
    let data = create_tiff_with_resolution(Endian::Little, (300, 1), (600, 2), None);
    assert_eq!(
        density_from_bytes(data).unwrap(),
        Some(DensityReading::new(300, 300))
    );
}

#[test]
fn test_tiff_resolution_centimeter() {
    let data = create_tiff_with_resolution(Endian::Big, (118, 1), (2835, 100), Some(3));
    assert_eq!(
        density_from_bytes(data).unwrap(),
        Some(DensityReading::new(300, 72))
    );
}

#[test]
fn test_tiff_without_resolution() {
    let data = create_tiff(Endian::Big, WIDTH, HEIGHT);
    assert_eq!(density_from_bytes(data).unwrap(), None);
}

#[test]
fn test_tiff_resolution_zero_denominator() {
    let data = create_tiff_with_resolution(Endian::Little, (300, 0), (300, 1), Some(2));
    let err = density_from_bytes(data).unwrap_err();
    assert!(matches!(err, SniffError::InvalidTiff(TiffError::Malformed(_))));
}

// =============================================================================
// No Density
// =============================================================================

#[test]
fn test_gif_has_no_density() {
    let data = create_gif(WIDTH as u16, HEIGHT as u16);
    assert_eq!(density_from_bytes(data).unwrap(), None);
}

#[test]
fn test_unknown_format_has_no_density() {
    assert_eq!(density_from_bytes(b"plain text".to_vec()).unwrap(), None);
}
