//! The tiling run: source inspection, tile enumeration, parallel rendering
//! and archive finalization.

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use archive::{tile_id, ArchiveError, ArchiveHeader, PmTilesWriter};
use grid_processor::{GeoTiffSource, RasterInfo, RasterSource};
use projection::transform_bounds;
use tempfile::NamedTempFile;
use tile_common::{BoundingBox, CrsCode};
use tracing::{debug, info, warn};

use crate::config::{EncodingConfig, TilerConfig};
use crate::error::{Result, TilerError};
use crate::grid::{tile_grid, TileGrid};
use crate::metadata::{tile_type, TilesetMetadata};
use crate::pool::WorkerPool;
use crate::render::GeoTiffWorkerFactory;

/// Default number of render workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Log progress every this many tiles.
const PROGRESS_INTERVAL: u64 = 1000;

/// Points sampled per edge when computing the geographic header bounds.
const HEADER_DENSIFY_POINTS: usize = 21;

/// Lifecycle of a [`Tiler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilerState {
    Created,
    SourceOpened,
    TilesEnumerated,
    Rendering,
    Finalizing,
    Closed,
}

impl fmt::Display for TilerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::SourceOpened => "source_opened",
            Self::TilesEnumerated => "tiles_enumerated",
            Self::Rendering => "rendering",
            Self::Finalizing => "finalizing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub tiles_rendered: u64,
    /// Distinct tile payloads after deduplication.
    pub unique_tiles: u64,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn tiles_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.tiles_rendered as f64 / secs
        } else {
            0.0
        }
    }
}

/// What the source looks like, read once up front.
struct SourceSummary {
    info: RasterInfo,
    geographic_bounds: BoundingBox,
}

/// Converts one raster into a PMTiles archive.
#[derive(Debug)]
pub struct Tiler {
    config: TilerConfig,
    encoding: EncodingConfig,
    state: TilerState,
}

impl Tiler {
    /// Validate `config`. Fails with [`TilerError::Configuration`] before
    /// touching the filesystem.
    pub fn new(config: TilerConfig) -> Result<Self> {
        let encoding = config.validate()?;
        Ok(Self {
            config,
            encoding,
            state: TilerState::Created,
        })
    }

    pub fn config(&self) -> &TilerConfig {
        &self.config
    }

    pub fn encoding(&self) -> &EncodingConfig {
        &self.encoding
    }

    pub fn state(&self) -> TilerState {
        self.state
    }

    /// Render every tile with `workers` threads and write the archive.
    ///
    /// On failure no file is left at the output path.
    pub fn run(&mut self, workers: usize) -> Result<RunSummary> {
        let result = self.run_inner(workers);
        self.transition(TilerState::Closed);
        if let Err(e) = &result {
            warn!(kind = e.kind(), error = %e, "Tiling run failed");
        }
        result
    }

    fn run_inner(&mut self, workers: usize) -> Result<RunSummary> {
        let started = Instant::now();
        let pool = WorkerPool::new(workers)?;

        let source = self.inspect_source()?;
        self.transition(TilerState::SourceOpened);

        let grid = self.enumerate(&source)?;
        let total = grid.total();
        self.transition(TilerState::TilesEnumerated);
        info!(
            tiles = total,
            min_zoom = self.config.min_zoom,
            max_zoom = self.config.max_zoom,
            workers = pool.workers(),
            format = %self.encoding.format,
            "Enumerated tiles"
        );

        let output_dir = output_dir(&self.config.output_path);
        let mut output = NamedTempFile::new_in(&output_dir).map_err(ArchiveError::from)?;
        let mut writer = PmTilesWriter::new_in(&output_dir)?;

        self.transition(TilerState::Rendering);
        let factory = GeoTiffWorkerFactory {
            path: self.config.source_path.clone(),
            config: self.encoding,
        };
        let mut written = 0u64;
        pool.run(grid, &factory, |rendered| {
            let t = rendered.tile;
            let id = tile_id(t.z, u64::from(t.x), u64::from(t.y));
            writer.write_tile(id, &rendered.bytes)?;
            written += 1;
            if written % PROGRESS_INTERVAL == 0 {
                let rate = written as f64 / started.elapsed().as_secs_f64().max(1e-9);
                info!(written, total, tiles_per_sec = rate.round(), "Progress");
            }
            Ok(())
        })?;

        self.transition(TilerState::Finalizing);
        let b = source.geographic_bounds;
        let bounds = (b.min_x, b.min_y, b.max_x, b.max_y);
        let header = ArchiveHeader::from_bounds(
            tile_type(self.encoding.format),
            bounds,
            self.config.min_zoom,
            self.config.max_zoom,
        );
        let metadata = TilesetMetadata::new(
            archive_name(&self.config.output_path),
            &self.encoding,
            bounds,
            self.config.min_zoom,
            self.config.max_zoom,
        );
        let metadata = serde_json::to_value(&metadata).map_err(ArchiveError::from)?;

        let stats = {
            let mut out = BufWriter::new(output.as_file_mut());
            let stats = writer.finalize(&mut out, header, &metadata)?;
            out.flush()?;
            stats
        };
        output.as_file().sync_all()?;
        output
            .persist(&self.config.output_path)
            .map_err(|e| ArchiveError::from(e.error))?;

        let summary = RunSummary {
            output_path: self.config.output_path.clone(),
            tiles_rendered: stats.addressed_tiles,
            unique_tiles: stats.tile_contents,
            bytes_written: stats.bytes_written,
            elapsed: started.elapsed(),
        };
        info!(
            path = %summary.output_path.display(),
            tiles = summary.tiles_rendered,
            unique = summary.unique_tiles,
            bytes = summary.bytes_written,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            tiles_per_sec = summary.tiles_per_second().round(),
            "Archive written"
        );
        Ok(summary)
    }

    /// Open the source once to learn its footprint, then close it.
    fn inspect_source(&self) -> Result<SourceSummary> {
        let path = &self.config.source_path;
        let source = GeoTiffSource::open(path).map_err(|e| TilerError::source_read(path, e))?;
        let info = source.info().clone();

        let geographic_bounds = transform_bounds(
            &info.bounds,
            info.crs,
            CrsCode::Epsg4326,
            HEADER_DENSIFY_POINTS,
        )
        .map_err(|e| TilerError::source_read(path, e))?;

        info!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            crs = %info.crs,
            data_type = %info.data_type,
            "Opened source"
        );
        Ok(SourceSummary {
            info,
            geographic_bounds,
        })
    }

    /// Tile grid for the source footprint, or the bounding tile when set.
    fn enumerate(&self, source: &SourceSummary) -> Result<TileGrid> {
        let (bbox, crs) = match self.config.bounding_tile() {
            Some(tile) => {
                debug!(tile = %tile, "Restricting output to bounding tile");
                (tile.latlon_bounds(), CrsCode::Epsg4326)
            }
            None => (source.info.bounds, source.info.crs),
        };
        tile_grid(&bbox, crs, self.config.min_zoom, self.config.max_zoom)
    }

    fn transition(&mut self, next: TilerState) {
        debug!(from = %self.state, to = %next, "Tiler state");
        self.state = next;
    }
}

fn output_dir(output_path: &Path) -> PathBuf {
    match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn archive_name(output_path: &Path) -> String {
    output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir() {
        assert_eq!(output_dir(Path::new("out.pmtiles")), PathBuf::from("."));
        assert_eq!(output_dir(Path::new("/tmp/a/out.pmtiles")), PathBuf::from("/tmp/a"));
    }

    #[test]
    fn test_archive_name() {
        assert_eq!(archive_name(Path::new("/data/dem.pmtiles")), "dem");
    }

    #[test]
    fn test_bad_format_fails_before_io() {
        let config = TilerConfig::new("/does/not/exist.tif", "/does/not/exist.pmtiles")
            .with_format("tiff");
        assert!(matches!(Tiler::new(config), Err(TilerError::Configuration(_))));
    }

    #[test]
    fn test_missing_source_closes() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pmtiles");
        let config = TilerConfig::new(dir.path().join("missing.tif"), &output);
        let mut tiler = Tiler::new(config).unwrap();
        assert_eq!(tiler.state(), TilerState::Created);

        let result = tiler.run(2);
        assert!(matches!(result, Err(TilerError::SourceRead { .. })));
        assert_eq!(tiler.state(), TilerState::Closed);
        assert!(!output.exists());
    }

    #[test]
    fn test_zero_workers() {
        let mut tiler = Tiler::new(TilerConfig::new("a.tif", "b.pmtiles")).unwrap();
        assert!(matches!(tiler.run(0), Err(TilerError::Configuration(_))));
    }
}
