//! Tests for tile encoding: value quantization plus PNG/WebP output decoded
//! back with the `image` crate.

use renderer::{decode_pixels, encode_rgb, ImageFormat};

// ============================================================================
// Helper functions
// ============================================================================

/// Elevation-like values: a ramp with a little structure.
fn elevation_values(width: usize, height: usize) -> Vec<f32> {
    let mut values = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            values.push(-50.0 + x as f32 * 13.7 + y as f32 * 0.3);
        }
    }
    values
}

fn decode_image(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
    let img = image::load_from_memory(bytes).expect("decodable image").to_rgb8();
    (img.width(), img.height(), img.into_raw())
}

// ============================================================================
// PNG
// ============================================================================

#[test]
fn test_png_pixels_roundtrip() {
    let values = elevation_values(64, 64);
    let rgb = encode_rgb(&values, -10000.0, 0.1, 0);
    let png = ImageFormat::Png.encode(&rgb, 64, 64).unwrap();

    let (w, h, pixels) = decode_image(&png);
    assert_eq!((w, h), (64, 64));
    assert_eq!(pixels, rgb);
}

#[test]
fn test_png_constant_tile() {
    let rgb = encode_rgb(&vec![100.0; 512 * 512], 0.0, 1.0, 0);
    let png = ImageFormat::Png.encode(&rgb, 512, 512).unwrap();

    let (_, _, pixels) = decode_image(&png);
    assert!(pixels.chunks_exact(3).all(|px| px == [0, 0, 100]));
    // A flat tile compresses to under 1% of its raw size
    let raw = 512 * 512 * 3;
    assert!(png.len() < raw / 100, "constant tile was {} bytes", png.len());
}

// ============================================================================
// WebP
// ============================================================================

#[test]
fn test_webp_is_lossless() {
    let values = elevation_values(32, 48);
    let rgb = encode_rgb(&values, -10000.0, 0.1, 0);
    let webp = ImageFormat::Webp.encode(&rgb, 32, 48).unwrap();

    let (w, h, pixels) = decode_image(&webp);
    assert_eq!((w, h), (32, 48));
    assert_eq!(pixels, rgb);
}

// ============================================================================
// Values survive the whole path
// ============================================================================

#[test]
fn test_values_survive_png() {
    let values = elevation_values(16, 16);
    let interval = 0.1;
    let rgb = encode_rgb(&values, -10000.0, interval, 0);
    let png = ImageFormat::Png.encode(&rgb, 16, 16).unwrap();

    let (_, _, pixels) = decode_image(&png);
    let decoded = decode_pixels(&pixels, -10000.0, interval);
    for (value, back) in values.iter().zip(decoded) {
        assert!(
            (back - *value as f64).abs() <= interval / 2.0 + 1e-3,
            "{} decoded as {}",
            value,
            back
        );
    }
}

#[test]
fn test_size_mismatch_is_error() {
    assert!(ImageFormat::Png.encode(&[0; 10], 2, 2).is_err());
    assert!(ImageFormat::Webp.encode(&[0; 10], 2, 2).is_err());
}
