//! Raster to RGB-encoded PMTiles pipeline.
//!
//! A single-band GeoTIFF is cut into web-mercator tiles over a zoom range.
//! Each tile is resampled, its values quantized into three bytes
//! (`value = base_val + (R * 65536 + G * 256 + B) * interval`) and written
//! as a lossless PNG or WebP into one PMTiles v3 archive.
//!
//! ```no_run
//! use tiler::{Tiler, TilerConfig};
//!
//! let config = TilerConfig::new("dem.tif", "dem.pmtiles")
//!     .with_zooms(0, 10)
//!     .with_encoding(-10000.0, 0.1, 0);
//! let summary = Tiler::new(config)?.run(4)?;
//! println!("{} tiles", summary.tiles_rendered);
//! # Ok::<(), tiler::TilerError>(())
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod metadata;
pub mod pool;
pub mod render;
pub mod tiler;

pub use config::{EncodingConfig, TilerConfig, DEFAULT_TILE_SIZE};
pub use error::{Result, TilerError};
pub use grid::{tile_grid, TileGrid};
pub use metadata::TilesetMetadata;
pub use pool::{PoolStats, WorkerPool};
pub use render::{render_tile, GeoTiffWorkerFactory, RenderedTile, TileWorkerFactory, WorkerContext};
pub use tiler::{RunSummary, Tiler, TilerState, DEFAULT_WORKERS};
