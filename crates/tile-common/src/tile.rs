//! Web Mercator (XYZ / slippy map) tile coordinates.
//!
//! Tiles follow the Google/OSM scheme: origin at the top-left corner of the
//! mercator square, `x` growing east and `y` growing south.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deepest zoom level the tile math supports (`2^z` must fit in a `u32`).
pub const MAX_ZOOM: u8 = 31;

/// Nudge applied before flooring normalized coordinates, so a point sitting
/// on a tile edge lands in the tile to its east/south.
const TILE_EDGE_EPSILON: f64 = 1.0e-14;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u8,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at zoom `z`.
    pub fn matrix_size(z: u8) -> u64 {
        1u64 << z
    }

    /// Whether `x` and `y` lie inside the `2^z × 2^z` matrix.
    pub fn is_valid(&self) -> bool {
        self.z <= MAX_ZOOM
            && (self.x as u64) < Self::matrix_size(self.z)
            && (self.y as u64) < Self::matrix_size(self.z)
    }

    /// Longitude/latitude of the tile's upper-left corner.
    pub fn upper_left(&self) -> (f64, f64) {
        let n = Self::matrix_size(self.z) as f64;
        let lon = self.x as f64 / n * 360.0 - 180.0;
        let lat = (std::f64::consts::PI * (1.0 - 2.0 * self.y as f64 / n))
            .sinh()
            .atan()
            .to_degrees();
        (lon, lat)
    }

    /// Geographic (lon/lat) bounds of the tile.
    pub fn latlon_bounds(&self) -> BoundingBox {
        let (lon_min, lat_max) = self.upper_left();
        let (lon_max, lat_min) = TileCoord::new(self.z, self.x + 1, self.y + 1).upper_left();
        BoundingBox::new(lon_min, lat_min, lon_max, lat_max)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Find the tile containing a lon/lat point at `zoom`.
///
/// Points outside the mercator square (including the poles) are clamped to
/// the edge tiles rather than rejected.
pub fn tile_for_lonlat(lon: f64, lat: f64, zoom: u8) -> TileCoord {
    let n = TileCoord::matrix_size(zoom) as f64;

    let x = lon / 360.0 + 0.5;
    let sin_lat = lat.to_radians().sin();
    let y = 0.5 - 0.25 * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / std::f64::consts::PI;

    TileCoord {
        z: zoom,
        x: normalized_to_index(x, n),
        y: normalized_to_index(y, n),
    }
}

fn normalized_to_index(value: f64, n: f64) -> u32 {
    let max_index = n - 1.0;
    if value <= 0.0 || value.is_nan() {
        0
    } else if value >= 1.0 {
        max_index as u32
    } else {
        ((value + TILE_EDGE_EPSILON) * n).floor().min(max_index) as u32
    }
}

/// A closed rectangle of tiles at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub z: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Minimal tile rectangle covering a geographic bbox at `zoom`.
    ///
    /// Uses the tile holding the (west, north) corner and the tile holding
    /// the (east, south) corner.
    pub fn covering(bbox: &BoundingBox, zoom: u8) -> TileRange {
        let upper_left = tile_for_lonlat(bbox.min_x, bbox.max_y, zoom);
        let lower_right = tile_for_lonlat(bbox.max_x, bbox.min_y, zoom);
        TileRange {
            z: zoom,
            min_x: upper_left.x,
            max_x: lower_right.x,
            min_y: upper_left.y,
            max_y: lower_right.y,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Number of tiles in the rectangle.
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        ((self.max_x - self.min_x) as u64 + 1) * ((self.max_y - self.min_y) as u64 + 1)
    }

    pub fn contains(&self, tile: &TileCoord) -> bool {
        tile.z == self.z
            && (self.min_x..=self.max_x).contains(&tile.x)
            && (self.min_y..=self.max_y).contains(&tile.y)
    }

    /// Iterate x-major, then y increasing.
    pub fn iter(&self) -> TileRangeIter {
        TileRangeIter {
            range: *self,
            x: self.min_x,
            y: self.min_y,
            done: self.is_empty(),
        }
    }
}

impl IntoIterator for TileRange {
    type Item = TileCoord;
    type IntoIter = TileRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the tiles of a [`TileRange`].
#[derive(Debug, Clone)]
pub struct TileRangeIter {
    range: TileRange,
    x: u32,
    y: u32,
    done: bool,
}

impl Iterator for TileRangeIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        if self.done {
            return None;
        }
        let tile = TileCoord::new(self.range.z, self.x, self.y);
        if self.y < self.range.max_y {
            self.y += 1;
        } else if self.x < self.range.max_x {
            self.x += 1;
            self.y = self.range.min_y;
        } else {
            self.done = true;
        }
        Some(tile)
    }
}
