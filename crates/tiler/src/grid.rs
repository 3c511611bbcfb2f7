//! Enumeration of the web-mercator tiles covering a footprint.

use projection::transform_bounds;
use tile_common::{BoundingBox, CrsCode, TileCoord, TileRange};

use crate::error::{Result, TilerError};

/// Inward nudge applied to every edge so that a bbox ending exactly on a
/// tile boundary does not pull in the neighbouring row or column.
pub const EDGE_EPSILON: f64 = 1e-10;

/// Intermediate points sampled along each edge when reprojecting bounds.
const DENSIFY_POINTS: usize = 2;

/// Lazy sequence of tiles, zoom by zoom, x-major then y increasing.
#[derive(Debug, Clone)]
pub struct TileGrid {
    ranges: Vec<TileRange>,
    current: usize,
    iter: Option<tile_common::tile::TileRangeIter>,
}

impl TileGrid {
    fn new(ranges: Vec<TileRange>) -> Self {
        Self {
            ranges,
            current: 0,
            iter: None,
        }
    }

    /// Per-zoom tile rectangles.
    pub fn ranges(&self) -> &[TileRange] {
        &self.ranges
    }

    /// Total number of tiles across all zooms.
    pub fn total(&self) -> u64 {
        self.ranges.iter().map(TileRange::len).sum()
    }
}

impl Iterator for TileGrid {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        loop {
            if let Some(tile) = self.iter.as_mut().and_then(Iterator::next) {
                return Some(tile);
            }
            let range = self.ranges.get(self.current)?;
            self.iter = Some(range.iter());
            self.current += 1;
        }
    }
}

/// Tiles covering `bbox` (given in `crs`) for every zoom in
/// `min_zoom..=max_zoom`. An inverted zoom range yields no tiles.
pub fn tile_grid(bbox: &BoundingBox, crs: CrsCode, min_zoom: u8, max_zoom: u8) -> Result<TileGrid> {
    let geographic = transform_bounds(bbox, crs, CrsCode::Epsg4326, DENSIFY_POINTS)
        .map_err(|e| TilerError::configuration(format!("cannot enumerate tiles: {}", e)))?;
    let shrunk = geographic.shrink(EDGE_EPSILON);

    let ranges = (min_zoom..=max_zoom)
        .map(|z| TileRange::covering(&shrunk, z))
        .collect();
    Ok(TileGrid::new(ranges))
}
