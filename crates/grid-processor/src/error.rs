//! Error types for raster access.

use thiserror::Error;

/// Errors that can occur while opening, reading or resampling a raster.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// Failed to open the raster file.
    #[error("failed to open raster: {0}")]
    OpenFailed(String),

    /// Failed to read pixel data from the raster.
    #[error("failed to read raster data: {0}")]
    ReadFailed(String),

    /// Missing or malformed georeferencing tags.
    #[error("invalid raster metadata: {0}")]
    InvalidMetadata(String),

    /// The raster CRS cannot be handled.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// The sample layout (band count, sample type) cannot be handled.
    #[error("unsupported sample layout: {0}")]
    UnsupportedLayout(String),

    /// A band index outside `1..=band_count` was requested.
    #[error("band {band} out of range (raster has {count})")]
    BandOutOfRange { band: usize, count: usize },

    /// Projection error.
    #[error("projection error: {0}")]
    ProjectionError(String),
}

impl GridProcessorError {
    /// Create an OpenFailed error.
    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create an UnsupportedLayout error.
    pub fn unsupported_layout(msg: impl Into<String>) -> Self {
        Self::UnsupportedLayout(msg.into())
    }
}

impl From<std::io::Error> for GridProcessorError {
    fn from(err: std::io::Error) -> Self {
        Self::OpenFailed(err.to_string())
    }
}

impl From<tiff::TiffError> for GridProcessorError {
    fn from(err: tiff::TiffError) -> Self {
        Self::ReadFailed(err.to_string())
    }
}

impl From<tile_common::crs::CrsParseError> for GridProcessorError {
    fn from(err: tile_common::crs::CrsParseError) -> Self {
        Self::UnsupportedCrs(err.to_string())
    }
}

impl From<projection::ProjectionError> for GridProcessorError {
    fn from(err: projection::ProjectionError) -> Self {
        Self::ProjectionError(err.to_string())
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
