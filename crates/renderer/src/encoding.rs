//! Terrain-RGB style value encoding.
//!
//! A continuous value is mapped to an integer step count
//! `n = round((value - base_val) / interval)` which is stored as three
//! base-256 digits: R is the high byte, G the middle byte, B the low byte.
//!
//! `n` is clamped to `[0, 2^24 - 1]`. Non-finite values (nodata, pixels
//! outside the source footprint) encode as `n = 0`, i.e. `base_val`.

/// Largest step count representable in three bytes.
pub const MAX_ENCODED: u32 = (1 << 24) - 1;

/// Round `value` to `digits` fractional decimal digits, ties to even.
///
/// Negative `digits` round to tens, hundreds, and so on.
pub fn round_to_digits(value: f64, digits: i32) -> f64 {
    if digits >= 0 {
        let scale = 10f64.powi(digits);
        (value * scale).round_ties_even() / scale
    } else {
        let scale = 10f64.powi(-digits);
        (value / scale).round_ties_even() * scale
    }
}

/// Step count for a single value.
#[inline]
pub fn quantize(value: f32, base_val: f64, interval: f64, round_digits: i32) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let ratio = round_to_digits((value as f64 - base_val) / interval, round_digits);
    let n = ratio.round_ties_even();
    if n.is_nan() || n <= 0.0 {
        0
    } else if n >= MAX_ENCODED as f64 {
        MAX_ENCODED
    } else {
        n as u32
    }
}

/// Encode a grid of values into interleaved RGB bytes (3 per value).
pub fn encode_rgb(values: &[f32], base_val: f64, interval: f64, round_digits: i32) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(values.len() * 3);
    for &value in values {
        let n = quantize(value, base_val, interval, round_digits);
        rgb.push(((n >> 16) & 0xFF) as u8);
        rgb.push(((n >> 8) & 0xFF) as u8);
        rgb.push((n & 0xFF) as u8);
    }
    rgb
}

/// Inverse of the encoding for one pixel.
#[inline]
pub fn decode_rgb(r: u8, g: u8, b: u8, base_val: f64, interval: f64) -> f64 {
    let n = (r as u32) << 16 | (g as u32) << 8 | b as u32;
    base_val + n as f64 * interval
}

/// Decode interleaved RGB bytes back into values.
pub fn decode_pixels(rgb: &[u8], base_val: f64, interval: f64) -> Vec<f64> {
    rgb.chunks_exact(3)
        .map(|px| decode_rgb(px[0], px[1], px[2], base_val, interval))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(encode_rgb(&[100.0], 0.0, 1.0, 0), vec![0, 0, 100]);
        assert_eq!(encode_rgb(&[256.0], 0.0, 1.0, 0), vec![0, 1, 0]);
        assert_eq!(encode_rgb(&[65536.0], 0.0, 1.0, 0), vec![1, 0, 0]);
    }

    #[test]
    fn test_mapbox_terrain_parameters() {
        // Terrain-RGB: base -10000, interval 0.1
        let rgb = encode_rgb(&[0.0], -10000.0, 0.1, 0);
        assert_eq!(rgb, vec![1, 134, 160]);
        let decoded = decode_rgb(rgb[0], rgb[1], rgb[2], -10000.0, 0.1);
        assert!(decoded.abs() < 1e-6);
    }

    #[test]
    fn test_roundtrip_within_half_interval() {
        let interval = 0.25;
        for i in 0..1000 {
            let value = -500.0 + i as f32 * 1.37;
            let rgb = encode_rgb(&[value], -1000.0, interval, 0);
            let decoded = decode_rgb(rgb[0], rgb[1], rgb[2], -1000.0, interval);
            assert!((decoded - value as f64).abs() <= interval / 2.0 + 1e-6);
        }
    }

    #[test]
    fn test_ties_to_even() {
        assert_eq!(quantize(2.5, 0.0, 1.0, 0), 2);
        assert_eq!(quantize(3.5, 0.0, 1.0, 0), 4);
    }

    #[test]
    fn test_round_digits_applies_to_ratio() {
        // ratio 12.345 rounds to 12.3 first, then to 12
        assert_eq!(quantize(12.345, 0.0, 1.0, 1), 12);
        // ratio 12.46 rounds to 12.5 first, then ties to 12
        assert_eq!(quantize(12.46, 0.0, 1.0, 1), 12);
        assert_eq!(round_to_digits(1234.0, -2), 1200.0);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(quantize(-5.0, 0.0, 1.0, 0), 0);
        assert_eq!(quantize(1.0e9, 0.0, 1.0, 0), MAX_ENCODED);
        assert_eq!(encode_rgb(&[1.0e9], 0.0, 1.0, 0), vec![255, 255, 255]);
    }

    #[test]
    fn test_non_finite_encodes_to_base() {
        assert_eq!(encode_rgb(&[f32::NAN, f32::INFINITY], 0.0, 1.0, 0), vec![0; 6]);
        let decoded = decode_pixels(&[0, 0, 0], 42.0, 1.0);
        assert_eq!(decoded, vec![42.0]);
    }

    #[test]
    fn test_deterministic() {
        let values: Vec<f32> = (0..512).map(|i| i as f32 * 0.7).collect();
        assert_eq!(
            encode_rgb(&values, 0.0, 0.5, 1),
            encode_rgb(&values, 0.0, 0.5, 1)
        );
    }
}
