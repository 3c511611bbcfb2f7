//! Common types and utilities shared across all rgbify crates.

pub mod bbox;
pub mod crs;
pub mod tile;

pub use bbox::BoundingBox;
pub use crs::CrsCode;
pub use tile::{TileCoord, TileRange};
