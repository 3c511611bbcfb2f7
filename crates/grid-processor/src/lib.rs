//! Raster access for the tiling pipeline.
//!
//! This crate opens single-band georeferenced rasters and resamples them onto
//! arbitrary target grids (typically one web-mercator tile at a time):
//!
//! - **Sources**: [`GeoTiffSource`] reads GeoTIFF files, [`InMemoryRaster`]
//!   wraps a grid already in memory. Both implement [`RasterSource`].
//! - **Reprojection**: [`reproject_to_grid`] maps every target pixel center
//!   back into the source and interpolates.
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{GeoTiffSource, InterpolationMethod, RasterSource};
//! use projection::Affine;
//! use tile_common::CrsCode;
//!
//! let mut source = GeoTiffSource::open("dem.tif")?;
//! let values = source.reproject(1, &tile_transform, 512, 512, CrsCode::Epsg3857,
//!     InterpolationMethod::Bilinear)?;
//! ```

pub mod error;
pub mod projection;
pub mod source;
pub mod types;

pub use error::{GridProcessorError, Result};
pub use projection::reproject_to_grid;
pub use source::{GeoTiffSource, InMemoryRaster, RasterSource};
pub use types::{DataType, InterpolationMethod, RasterInfo, TargetGrid};
