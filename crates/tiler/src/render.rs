//! Rendering of a single tile.

use std::path::{Path, PathBuf};

use grid_processor::{GeoTiffSource, InterpolationMethod, RasterSource};
use projection::mercator::tile_xy_bounds;
use projection::Affine;
use renderer::encode_rgb;
use tile_common::{CrsCode, TileCoord};
use tracing::debug;

use crate::config::EncodingConfig;
use crate::error::{Result, TilerError};

/// The band every tile is rendered from.
const SOURCE_BAND: usize = 1;

/// Output of [`render_tile`].
#[derive(Debug, Clone)]
pub struct RenderedTile {
    pub tile: TileCoord,
    /// Pixel → EPSG:3857 transform of the tile grid.
    pub transform: Affine,
    /// Interleaved RGB, `tile_size × tile_size × 3`.
    pub pixels: Vec<u8>,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

/// Resample, encode and compress one tile.
pub fn render_tile<S: RasterSource + ?Sized>(
    tile: TileCoord,
    source: &mut S,
    config: &EncodingConfig,
) -> Result<RenderedTile> {
    let size = config.tile_size as usize;
    let footprint = tile_xy_bounds(&tile);
    let transform = Affine::from_bounds(&footprint, config.tile_size, config.tile_size);

    let values = source
        .reproject(
            SOURCE_BAND,
            &transform,
            size,
            size,
            CrsCode::Epsg3857,
            InterpolationMethod::Bilinear,
        )
        .map_err(|e| TilerError::tile_render(tile, e))?;

    let pixels = encode_rgb(&values, config.base_val, config.interval, config.round_digits);
    let bytes = config
        .format
        .encode(&pixels, size, size)
        .map_err(|e| TilerError::tile_render(tile, e))?;

    debug!(tile = %tile, bytes = bytes.len(), "Rendered tile");

    Ok(RenderedTile {
        tile,
        transform,
        pixels,
        bytes,
    })
}

/// Per-worker state: a private source handle plus the encoding settings.
pub struct WorkerContext<S = GeoTiffSource> {
    pub worker_id: usize,
    pub source: S,
    pub config: EncodingConfig,
}

impl WorkerContext<GeoTiffSource> {
    /// Open a fresh handle on `path` for one worker.
    pub fn open(worker_id: usize, path: &Path, config: EncodingConfig) -> Result<Self> {
        let source = GeoTiffSource::open(path).map_err(|e| TilerError::source_read(path, e))?;
        debug!(worker_id, path = %path.display(), "Worker opened source");
        Ok(Self {
            worker_id,
            source,
            config,
        })
    }
}

impl<S: RasterSource> WorkerContext<S> {
    pub fn new(worker_id: usize, source: S, config: EncodingConfig) -> Self {
        Self {
            worker_id,
            source,
            config,
        }
    }

    pub fn render(&mut self, tile: TileCoord) -> Result<RenderedTile> {
        render_tile(tile, &mut self.source, &self.config)
    }
}

/// Builds worker contexts. Called once per worker, on the worker's thread.
pub trait TileWorkerFactory: Sync {
    type Source: RasterSource;

    fn create(&self, worker_id: usize) -> Result<WorkerContext<Self::Source>>;
}

/// Factory opening one [`GeoTiffSource`] per worker.
#[derive(Debug, Clone)]
pub struct GeoTiffWorkerFactory {
    pub path: PathBuf,
    pub config: EncodingConfig,
}

impl TileWorkerFactory for GeoTiffWorkerFactory {
    type Source = GeoTiffSource;

    fn create(&self, worker_id: usize) -> Result<WorkerContext<GeoTiffSource>> {
        WorkerContext::open(worker_id, &self.path, self.config)
    }
}

impl<S, F> TileWorkerFactory for F
where
    S: RasterSource,
    F: Fn(usize) -> Result<WorkerContext<S>> + Sync,
{
    type Source = S;

    fn create(&self, worker_id: usize) -> Result<WorkerContext<S>> {
        self(worker_id)
    }
}
