//! Core types for raster access.

use projection::Affine;
use tile_common::{BoundingBox, CrsCode};

/// Sample type as stored in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        };
        f.write_str(name)
    }
}

/// Georeferenced description of a raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfo {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Number of bands.
    pub band_count: usize,
    /// Footprint in the raster's own CRS.
    pub bounds: BoundingBox,
    /// Native CRS.
    pub crs: CrsCode,
    /// Nodata value, if declared.
    pub nodata: Option<f64>,
    /// Sample type of the stored pixels.
    pub data_type: DataType,
    /// Pixel → world transform (pixel corners).
    pub transform: Affine,
}

impl RasterInfo {
    /// Build info for a north-up raster covering `bounds`.
    pub fn north_up(width: usize, height: usize, bounds: BoundingBox, crs: CrsCode) -> Self {
        Self {
            width,
            height,
            band_count: 1,
            bounds,
            crs,
            nodata: None,
            data_type: DataType::Float32,
            transform: Affine::from_bounds(&bounds, width as u32, height as u32),
        }
    }
}

/// Interpolation method for resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMethod {
    /// Nearest neighbor (preserves exact values).
    Nearest,
    /// Bilinear interpolation (smooth, slight value changes).
    #[default]
    Bilinear,
}

impl InterpolationMethod {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nearest" => Some(Self::Nearest),
            "bilinear" => Some(Self::Bilinear),
            _ => None,
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
        }
    }
}

/// Destination grid for a reprojection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetGrid {
    pub transform: Affine,
    pub width: usize,
    pub height: usize,
    pub crs: CrsCode,
}
