//! Spherical (Web) Mercator projection, EPSG:3857.
//!
//! Forward and inverse transforms between WGS84 lon/lat degrees and
//! mercator meters on a sphere of radius 6378137 m.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use tile_common::{BoundingBox, TileCoord};

/// Sphere radius used by EPSG:3857 (meters).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the width of the mercator square (meters).
pub const MAX_EXTENT: f64 = 20_037_508.342_789_244;

/// Project lon/lat degrees to mercator meters.
///
/// Latitudes at or beyond the poles project to infinity, matching the
/// behavior of the usual tile tooling.
pub fn lonlat_to_xy(lon: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS * lon.to_radians();
    let y = if lat <= -90.0 {
        f64::NEG_INFINITY
    } else if lat >= 90.0 {
        f64::INFINITY
    } else {
        EARTH_RADIUS * (FRAC_PI_4 + 0.5 * lat.to_radians()).tan().ln()
    };
    (x, y)
}

/// Unproject mercator meters to lon/lat degrees.
pub fn xy_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (FRAC_PI_2 - 2.0 * (-y / EARTH_RADIUS).exp().atan()).to_degrees();
    (lon, lat)
}

/// Footprint of a tile in mercator meters.
///
/// The south-west corner is the upper-left of the tile below (`y + 1`) and
/// the north-east corner is the upper-left of the tile to the right (`x + 1`).
pub fn tile_xy_bounds(tile: &TileCoord) -> BoundingBox {
    let (west, south) = TileCoord::new(tile.z, tile.x, tile.y + 1).upper_left();
    let (east, north) = TileCoord::new(tile.z, tile.x + 1, tile.y).upper_left();
    let (min_x, min_y) = lonlat_to_xy(west, south);
    let (max_x, max_y) = lonlat_to_xy(east, north);
    BoundingBox::new(min_x, min_y, max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let (x, y) = lonlat_to_xy(0.0, 0.0);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn test_antimeridian_is_max_extent() {
        let (x, _) = lonlat_to_xy(180.0, 0.0);
        assert!((x - MAX_EXTENT).abs() < 1e-6);
    }

    #[test]
    fn test_poles_are_infinite() {
        assert_eq!(lonlat_to_xy(0.0, 90.0).1, f64::INFINITY);
        assert_eq!(lonlat_to_xy(0.0, -90.0).1, f64::NEG_INFINITY);
    }

    #[test]
    fn test_roundtrip() {
        for &(lon, lat) in &[(-122.4, 37.8), (151.2, -33.9), (0.0, 85.0), (-179.9, -60.0)] {
            let (x, y) = lonlat_to_xy(lon, lat);
            let (rlon, rlat) = xy_to_lonlat(x, y);
            assert!((rlon - lon).abs() < 1e-9, "lon {} -> {}", lon, rlon);
            assert!((rlat - lat).abs() < 1e-9, "lat {} -> {}", lat, rlat);
        }
    }

    #[test]
    fn test_world_tile_bounds() {
        let bounds = tile_xy_bounds(&TileCoord::new(0, 0, 0));
        assert!((bounds.min_x + MAX_EXTENT).abs() < 1e-3);
        assert!((bounds.max_x - MAX_EXTENT).abs() < 1e-3);
        assert!((bounds.min_y + MAX_EXTENT).abs() < 1e-3);
        assert!((bounds.max_y - MAX_EXTENT).abs() < 1e-3);
    }

    #[test]
    fn test_quadrant_tile_bounds() {
        // 1/1/0 is the north-east quadrant
        let bounds = tile_xy_bounds(&TileCoord::new(1, 1, 0));
        assert!(bounds.min_x.abs() < 1e-3);
        assert!(bounds.min_y.abs() < 1e-3);
        assert!((bounds.max_x - MAX_EXTENT).abs() < 1e-3);
        assert!((bounds.max_y - MAX_EXTENT).abs() < 1e-3);
    }
}
