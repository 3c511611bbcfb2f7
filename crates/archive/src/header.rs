//! Caller-supplied part of the archive header.

use pmtiles2::{Compression, PMTiles, TileType};

/// Tile format, zoom range, bounds and center of an archive.
///
/// Offsets, counts and directory layout are filled in when the archive is
/// written.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveHeader {
    pub tile_type: TileType,
    pub tile_compression: Compression,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// `(west, south, east, north)` in degrees.
    pub bounds: (f64, f64, f64, f64),
    pub center_zoom: u8,
    /// `(lon, lat)` in degrees.
    pub center: (f64, f64),
}

impl ArchiveHeader {
    /// Header for uncompressed tiles covering `(west, south, east, north)`,
    /// centered on the bounds' midpoint at `min_zoom`.
    pub fn from_bounds(
        tile_type: TileType,
        bounds: (f64, f64, f64, f64),
        min_zoom: u8,
        max_zoom: u8,
    ) -> Self {
        let (west, south, east, north) = bounds;
        Self {
            tile_type,
            tile_compression: Compression::None,
            min_zoom,
            max_zoom,
            bounds,
            center_zoom: min_zoom,
            center: ((west + east) / 2.0, (south + north) / 2.0),
        }
    }

    pub(crate) fn apply<R>(self, archive: &mut PMTiles<R>) {
        let (west, south, east, north) = self.bounds;
        archive.tile_type = self.tile_type;
        archive.tile_compression = self.tile_compression;
        archive.min_zoom = self.min_zoom;
        archive.max_zoom = self.max_zoom;
        archive.min_longitude = west;
        archive.min_latitude = south;
        archive.max_longitude = east;
        archive.max_latitude = north;
        archive.center_zoom = self.center_zoom;
        archive.center_longitude = self.center.0;
        archive.center_latitude = self.center.1;
    }
}
