//! Reprojection of a source band onto an arbitrary target grid.
//!
//! For each target pixel center, the point is transformed into the source
//! CRS, mapped to a fractional source pixel through the inverse source
//! transform and sampled with the chosen interpolation method.

use projection::transform_point;

use super::{bilinear_interpolate, nearest_interpolate};
use crate::error::{GridProcessorError, Result};
use crate::types::{InterpolationMethod, RasterInfo, TargetGrid};

/// Reproject a single band onto `target`.
///
/// # Arguments
/// * `data` - Source band in row-major order (top-to-bottom, left-to-right)
/// * `info` - Source dimensions, transform and CRS
/// * `target` - Destination transform, dimensions and CRS
/// * `method` - Interpolation method
///
/// # Returns
/// `target.width * target.height` values. Pixels whose center falls outside
/// the source footprint are NaN.
pub fn reproject_to_grid(
    data: &[f32],
    info: &RasterInfo,
    target: &TargetGrid,
    method: InterpolationMethod,
) -> Result<Vec<f32>> {
    let (src_width, src_height) = (info.width, info.height);
    if src_width == 0 || src_height == 0 || data.len() != src_width * src_height {
        return Err(GridProcessorError::read_failed(format!(
            "band has {} values, expected {}x{}",
            data.len(),
            src_width,
            src_height
        )));
    }

    // Fail fast on a degenerate source transform
    if info.transform.invert(info.transform.c, info.transform.f).is_none() {
        return Err(GridProcessorError::invalid_metadata(
            "source transform is not invertible",
        ));
    }

    let max_col = (src_width - 1) as f64;
    let max_row = (src_height - 1) as f64;
    let mut output = vec![f32::NAN; target.width * target.height];

    for row in 0..target.height {
        for col in 0..target.width {
            let (x, y) = target.transform.pixel_center(col, row);
            let (sx, sy) = transform_point(x, y, target.crs, info.crs);

            let Some((src_col, src_row)) = info.transform.invert(sx, sy) else {
                continue;
            };

            // Shift from pixel-corner to pixel-center indices
            let px = src_col - 0.5;
            let py = src_row - 0.5;

            // Outside coverage (half a pixel beyond the outermost centers)
            if !(px >= -0.5 && px <= max_col + 0.5 && py >= -0.5 && py <= max_row + 0.5) {
                continue;
            }

            let px = px.clamp(0.0, max_col);
            let py = py.clamp(0.0, max_row);

            output[row * target.width + col] = match method {
                InterpolationMethod::Nearest => {
                    nearest_interpolate(data, src_width, src_height, px, py)
                }
                InterpolationMethod::Bilinear => {
                    bilinear_interpolate(data, src_width, src_height, px, py)
                }
            };
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::mercator::{tile_xy_bounds, MAX_EXTENT};
    use projection::Affine;
    use tile_common::{BoundingBox, CrsCode, TileCoord};

    fn global_info(width: usize, height: usize) -> RasterInfo {
        RasterInfo::north_up(
            width,
            height,
            BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
            CrsCode::Epsg4326,
        )
    }

    fn tile_target(tile: TileCoord, size: usize) -> TargetGrid {
        TargetGrid {
            transform: Affine::from_bounds(&tile_xy_bounds(&tile), size as u32, size as u32),
            width: size,
            height: size,
            crs: CrsCode::Epsg3857,
        }
    }

    #[test]
    fn test_constant_grid_stays_constant() {
        let info = global_info(64, 32);
        let data = vec![100.0f32; 64 * 32];
        let out = reproject_to_grid(
            &data,
            &info,
            &tile_target(TileCoord::new(0, 0, 0), 16),
            InterpolationMethod::Bilinear,
        )
        .unwrap();
        assert_eq!(out.len(), 256);
        assert!(out.iter().all(|v| (v - 100.0).abs() < 1e-4));
    }

    #[test]
    fn test_outside_coverage_is_nan() {
        // Source only covers the eastern hemisphere
        let info = RasterInfo::north_up(
            10,
            10,
            BoundingBox::new(0.0, -45.0, 180.0, 45.0),
            CrsCode::Epsg4326,
        );
        let data = vec![1.0f32; 100];
        let out = reproject_to_grid(
            &data,
            &info,
            &tile_target(TileCoord::new(1, 0, 0), 8),
            InterpolationMethod::Bilinear,
        )
        .unwrap();
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_identity_grid_nearest() {
        let extent = MAX_EXTENT;
        let bounds = BoundingBox::new(-extent, -extent, extent, extent);
        let info = RasterInfo::north_up(4, 4, bounds, CrsCode::Epsg3857);
        let data: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let target = TargetGrid {
            transform: Affine::from_bounds(&bounds, 4, 4),
            width: 4,
            height: 4,
            crs: CrsCode::Epsg3857,
        };
        let out = reproject_to_grid(&data, &info, &target, InterpolationMethod::Nearest).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let info = global_info(4, 4);
        let result = reproject_to_grid(
            &[0.0; 3],
            &info,
            &tile_target(TileCoord::new(0, 0, 0), 4),
            InterpolationMethod::Bilinear,
        );
        assert!(matches!(result, Err(GridProcessorError::ReadFailed(_))));
    }
}
