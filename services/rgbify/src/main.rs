//! rgbify: convert a single-band GeoTIFF into a PMTiles archive of
//! RGB-encoded web-mercator tiles.

mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tiler::{Tiler, DEFAULT_WORKERS};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{parse_bounding_tile, Overrides};

#[derive(Parser, Debug)]
#[command(name = "rgbify")]
#[command(about = "Encode a single-band raster as RGB tiles in a PMTiles archive")]
struct Args {
    /// Source GeoTIFF
    src: Option<PathBuf>,

    /// Destination PMTiles file
    dst: Option<PathBuf>,

    /// Minimum zoom level
    #[arg(long = "min-z")]
    min_z: Option<u8>,

    /// Maximum zoom level
    #[arg(long = "max-z")]
    max_z: Option<u8>,

    /// Value encoded as (0, 0, 0)
    #[arg(long, allow_hyphen_values = true)]
    base_val: Option<f64>,

    /// Value step per encoded unit
    #[arg(long)]
    interval: Option<f64>,

    /// Decimal digits kept before rounding
    #[arg(long, allow_hyphen_values = true)]
    round_digits: Option<i32>,

    /// Tile image format (png or webp)
    #[arg(long)]
    format: Option<String>,

    /// Only render tiles inside this tile, as "[x, y, z]"
    #[arg(long, value_parser = parse_bounding_tile)]
    bounding_tile: Option<[u32; 3]>,

    /// Number of render workers
    #[arg(short, long, env = "RGBIFY_WORKERS", default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// YAML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "RGBIFY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let base = args.config.as_deref().map(config::load_file).transpose()?;
    let overrides = Overrides {
        source: args.src,
        output: args.dst,
        min_zoom: args.min_z,
        max_zoom: args.max_z,
        base_val: args.base_val,
        interval: args.interval,
        round_digits: args.round_digits,
        format: args.format,
        bounding_tile: args.bounding_tile,
    };
    let config = config::resolve(base, overrides)?;

    info!(
        source = %config.source_path.display(),
        output = %config.output_path.display(),
        min_zoom = config.min_zoom,
        max_zoom = config.max_zoom,
        workers = args.workers,
        "Starting rgbify"
    );

    let mut tiler = Tiler::new(config)?;
    match tiler.run(args.workers) {
        Ok(summary) => {
            info!(
                tiles = summary.tiles_rendered,
                unique = summary.unique_tiles,
                bytes = summary.bytes_written,
                elapsed_secs = summary.elapsed.as_secs_f64(),
                "Done"
            );
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "rgbify failed");
            Err(e.into())
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
