//! Point and bounding-box transforms between supported CRS codes.

use thiserror::Error;
use tile_common::{BoundingBox, CrsCode};

use crate::mercator::{lonlat_to_xy, xy_to_lonlat};

/// Errors raised while transforming coordinates.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The transformed bounds are not finite (e.g. a pole projected to mercator).
    #[error("bounds {bbox:?} are not finite in {crs}")]
    NonFiniteBounds { bbox: BoundingBox, crs: CrsCode },

    /// The input bounds are inverted or contain NaN.
    #[error("invalid bounds: {0:?}")]
    InvalidBounds(BoundingBox),
}

/// Transform a single point from one CRS to another.
pub fn transform_point(x: f64, y: f64, from: CrsCode, to: CrsCode) -> (f64, f64) {
    match (from, to) {
        (CrsCode::Epsg4326, CrsCode::Epsg3857) => lonlat_to_xy(x, y),
        (CrsCode::Epsg3857, CrsCode::Epsg4326) => xy_to_lonlat(x, y),
        _ => (x, y),
    }
}

/// Transform a bounding box, sampling `densify` extra points along each edge.
///
/// The result is the min/max envelope of every transformed sample, so curved
/// edges in the target CRS are still covered.
pub fn transform_bounds(
    bbox: &BoundingBox,
    from: CrsCode,
    to: CrsCode,
    densify: usize,
) -> Result<BoundingBox, ProjectionError> {
    if !(bbox.min_x <= bbox.max_x && bbox.min_y <= bbox.max_y) {
        return Err(ProjectionError::InvalidBounds(*bbox));
    }
    if from == to {
        return Ok(*bbox);
    }

    let steps = densify + 1;
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let mut visit = |x: f64, y: f64| {
        let (tx, ty) = transform_point(x, y, from, to);
        min_x = min_x.min(tx);
        min_y = min_y.min(ty);
        max_x = max_x.max(tx);
        max_y = max_y.max(ty);
    };

    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = bbox.min_x + t * bbox.width();
        let y = bbox.min_y + t * bbox.height();
        visit(x, bbox.min_y);
        visit(x, bbox.max_y);
        visit(bbox.min_x, y);
        visit(bbox.max_x, y);
    }

    let out = BoundingBox::new(min_x, min_y, max_x, max_y);
    if [min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
        Ok(out)
    } else {
        Err(ProjectionError::NonFiniteBounds { bbox: out, crs: to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mercator::MAX_EXTENT;

    #[test]
    fn test_identity() {
        let bbox = BoundingBox::new(-10.0, -5.0, 10.0, 5.0);
        let out = transform_bounds(&bbox, CrsCode::Epsg4326, CrsCode::Epsg4326, 2).unwrap();
        assert_eq!(out, bbox);
    }

    #[test]
    fn test_mercator_world_to_geographic() {
        let bbox = BoundingBox::new(-MAX_EXTENT, -MAX_EXTENT, MAX_EXTENT, MAX_EXTENT);
        let out = transform_bounds(&bbox, CrsCode::Epsg3857, CrsCode::Epsg4326, 2).unwrap();
        assert!((out.min_x + 180.0).abs() < 1e-9);
        assert!((out.max_x - 180.0).abs() < 1e-9);
        assert!((out.max_y - 85.051_128_779_806_59).abs() < 1e-9);
        assert!((out.min_y + 85.051_128_779_806_59).abs() < 1e-9);
    }

    #[test]
    fn test_geographic_pole_to_mercator_fails() {
        let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
        let result = transform_bounds(&bbox, CrsCode::Epsg4326, CrsCode::Epsg3857, 2);
        assert!(matches!(result, Err(ProjectionError::NonFiniteBounds { .. })));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let bbox = BoundingBox::new(10.0, 0.0, -10.0, 5.0);
        let result = transform_bounds(&bbox, CrsCode::Epsg3857, CrsCode::Epsg4326, 2);
        assert!(matches!(result, Err(ProjectionError::InvalidBounds(_))));
    }
}
