//! PMTiles v3 archive output.
//!
//! [`PmTilesWriter`] accepts tiles in any order, buffers them on disk with
//! identical payloads stored once, and at finalize hands them to the
//! [`pmtiles2`] container sorted by tile id. Directory layout, leaf
//! directories and compression are the container's job.
//!
//! Tiles are addressed by their Hilbert [`tile_id`].

pub mod error;
pub mod header;
pub mod writer;

pub use error::{ArchiveError, Result};
pub use header::ArchiveHeader;
pub use pmtiles2::util::tile_id;
pub use pmtiles2::{Compression, PMTiles, TileType};
pub use writer::{FinalizeStats, PmTilesWriter};
