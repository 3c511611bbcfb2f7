//! Run configuration.
//!
//! [`TilerConfig`] is what callers fill in (directly, from CLI flags or from
//! a YAML file). [`TilerConfig::validate`] checks it without touching the
//! filesystem and yields the immutable [`EncodingConfig`] handed to every
//! worker.

use std::path::PathBuf;

use renderer::ImageFormat;
use serde::{Deserialize, Serialize};
use tile_common::TileCoord;

use crate::error::{Result, TilerError};

/// Edge length of every output tile, in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 512;

/// Deepest zoom level accepted.
pub const MAX_ZOOM: u8 = 30;

/// Tiling run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilerConfig {
    /// Single-band GeoTIFF to read.
    pub source_path: PathBuf,

    /// PMTiles file to create.
    pub output_path: PathBuf,

    pub min_zoom: u8,
    pub max_zoom: u8,

    /// Value step represented by one encoded unit.
    pub interval: f64,

    /// Value encoded as `(0, 0, 0)`.
    pub base_val: f64,

    /// Decimal digits kept before rounding to whole steps.
    pub round_digits: i32,

    /// Restrict output to the footprint of this `[x, y, z]` tile.
    pub bounding_tile: Option<[u32; 3]>,

    /// Tile image format: `png` or `webp`.
    pub format: String,

    pub tile_size: u32,
}

impl Default for TilerConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::new(),
            output_path: PathBuf::new(),
            min_zoom: 0,
            max_zoom: 0,
            interval: 1.0,
            base_val: 0.0,
            round_digits: 0,
            bounding_tile: None,
            format: ImageFormat::Png.as_str().to_string(),
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl TilerConfig {
    pub fn new(source_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    /// Set the zoom range.
    pub fn with_zooms(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Set base value, interval and rounding digits.
    pub fn with_encoding(mut self, base_val: f64, interval: f64, round_digits: i32) -> Self {
        self.base_val = base_val;
        self.interval = interval;
        self.round_digits = round_digits;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_bounding_tile(mut self, tile: [u32; 3]) -> Self {
        self.bounding_tile = Some(tile);
        self
    }

    /// Bounding tile as a [`TileCoord`], if set.
    pub fn bounding_tile(&self) -> Option<TileCoord> {
        self.bounding_tile.map(|[x, y, z]| TileCoord::new(z as u8, x, y))
    }

    /// Check the configuration and build the per-worker encoding settings.
    pub fn validate(&self) -> Result<EncodingConfig> {
        let format = ImageFormat::parse(&self.format).ok_or_else(|| {
            TilerError::configuration(format!(
                "unsupported image format '{}' (expected png or webp)",
                self.format
            ))
        })?;

        if self.min_zoom > self.max_zoom {
            return Err(TilerError::configuration(format!(
                "min_zoom {} is greater than max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.max_zoom > MAX_ZOOM {
            return Err(TilerError::configuration(format!(
                "max_zoom {} exceeds {}",
                self.max_zoom, MAX_ZOOM
            )));
        }
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(TilerError::configuration(format!(
                "interval must be a positive number, got {}",
                self.interval
            )));
        }
        if !self.base_val.is_finite() {
            return Err(TilerError::configuration(format!(
                "base_val must be finite, got {}",
                self.base_val
            )));
        }
        if !(-15..=15).contains(&self.round_digits) {
            return Err(TilerError::configuration(format!(
                "round_digits {} outside -15..=15",
                self.round_digits
            )));
        }
        if self.tile_size == 0 || self.tile_size > 4096 {
            return Err(TilerError::configuration(format!(
                "tile_size {} outside 1..=4096",
                self.tile_size
            )));
        }
        if let Some([x, y, z]) = self.bounding_tile {
            let valid = z <= MAX_ZOOM as u32 && {
                let n = 1u64 << z;
                (x as u64) < n && (y as u64) < n
            };
            if !valid {
                return Err(TilerError::configuration(format!(
                    "bounding tile [{}, {}, {}] is not a valid tile",
                    x, y, z
                )));
            }
        }

        Ok(EncodingConfig {
            base_val: self.base_val,
            interval: self.interval,
            round_digits: self.round_digits,
            tile_size: self.tile_size,
            format,
        })
    }
}

/// Immutable encoding settings shared by value with every worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodingConfig {
    pub base_val: f64,
    pub interval: f64,
    pub round_digits: i32,
    pub tile_size: u32,
    pub format: ImageFormat,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            base_val: 0.0,
            interval: 1.0,
            round_digits: 0,
            tile_size: DEFAULT_TILE_SIZE,
            format: ImageFormat::Png,
        }
    }
}
