//! Error types for the tiling pipeline.

use std::path::PathBuf;

use archive::ArchiveError;
use thiserror::Error;
use tile_common::TileCoord;

/// Errors that can occur during a tiling run.
#[derive(Error, Debug)]
pub enum TilerError {
    /// Invalid configuration, detected before any file is opened.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The source raster could not be opened or is not usable.
    #[error("failed to read source {}: {reason}", path.display())]
    SourceRead { path: PathBuf, reason: String },

    /// Resampling or encoding of a single tile failed.
    #[error("failed to render tile {tile}: {reason}")]
    TileRender { tile: TileCoord, reason: String },

    /// Writing, finalizing or persisting the archive failed.
    #[error("archive write failed: {0}")]
    ArchiveWrite(#[from] ArchiveError),

    /// A worker thread panicked.
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
}

impl TilerError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a SourceRead error.
    pub fn source_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a TileRender error.
    pub fn tile_render(tile: TileCoord, reason: impl ToString) -> Self {
        Self::TileRender {
            tile,
            reason: reason.to_string(),
        }
    }

    /// Short stable name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::SourceRead { .. } => "source_read",
            Self::TileRender { .. } => "tile_render",
            Self::ArchiveWrite(_) => "archive_write",
            Self::WorkerPanicked(_) => "worker_panicked",
        }
    }
}

impl From<std::io::Error> for TilerError {
    fn from(err: std::io::Error) -> Self {
        Self::ArchiveWrite(ArchiveError::Io(err))
    }
}

/// Result type for tiling operations.
pub type Result<T> = std::result::Result<T, TilerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = TilerError::tile_render(TileCoord::new(3, 2, 1), "boom");
        assert_eq!(err.to_string(), "failed to render tile 3/2/1: boom");
        assert_eq!(err.kind(), "tile_render");

        let err = TilerError::source_read("/data/dem.tif", "no such file");
        assert!(err.to_string().contains("/data/dem.tif"));
        assert_eq!(err.kind(), "source_read");
    }

    #[test]
    fn test_io_error_is_archive_write() {
        let err: TilerError = std::io::Error::other("disk full").into();
        assert_eq!(err.kind(), "archive_write");
    }
}
