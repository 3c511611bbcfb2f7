//! Interpolation methods for grid resampling.
//!
//! Coordinates are fractional pixel-center indices: `(0.0, 0.0)` is the
//! center of the top-left pixel. Callers clamp to `[0, width - 1]` and
//! `[0, height - 1]` beforehand.

/// Nearest neighbor interpolation.
///
/// Returns the value of the nearest grid point.
pub fn nearest_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if x < 0.0 || y < 0.0 {
        return f32::NAN;
    }
    let col = x.round() as usize;
    let row = y.round() as usize;

    if col >= width || row >= height {
        return f32::NAN;
    }

    data[row * width + col]
}

/// Bilinear interpolation.
///
/// Smoothly interpolates between the four nearest grid points.
pub fn bilinear_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if x < 0.0 || y < 0.0 {
        return f32::NAN;
    }
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;

    if x0 >= width || y0 >= height {
        return f32::NAN;
    }

    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = (x - x0 as f64) as f32;
    let yf = (y - y0 as f64) as f32;

    let v00 = data[y0 * width + x0];
    let v10 = data[y0 * width + x1];
    let v01 = data[y1 * width + x0];
    let v11 = data[y1 * width + x1];

    // Handle NaN values - if any corner is NaN, return NaN
    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_interpolation() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(nearest_interpolate(&data, 2, 2, 0.0, 0.0), 1.0);
        assert_eq!(nearest_interpolate(&data, 2, 2, 0.6, 0.0), 2.0);
        assert_eq!(nearest_interpolate(&data, 2, 2, 0.4, 0.6), 3.0);
        assert!(nearest_interpolate(&data, 2, 2, 2.0, 0.0).is_nan());
    }

    #[test]
    fn test_bilinear_interpolation() {
        let data = vec![0.0, 1.0, 2.0, 3.0];

        // Corners
        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.0, 0.0), 0.0);
        assert_eq!(bilinear_interpolate(&data, 2, 2, 1.0, 1.0), 3.0);

        // Center should be the average of all four
        let center = bilinear_interpolate(&data, 2, 2, 0.5, 0.5);
        assert!((center - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_bilinear_nan_corner() {
        let data = vec![0.0, f32::NAN, 2.0, 3.0];
        assert!(bilinear_interpolate(&data, 2, 2, 0.5, 0.5).is_nan());
    }

    #[test]
    fn test_bilinear_negative_is_nan() {
        let data = vec![1.0; 4];
        assert!(bilinear_interpolate(&data, 2, 2, -0.25, 0.0).is_nan());
    }
}
