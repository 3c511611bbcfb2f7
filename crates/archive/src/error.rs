//! Error types for archive writing.

use thiserror::Error;

/// Errors that can occur while building an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Underlying I/O failure (spill file, output, or the container library).
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The same tile id was written twice.
    #[error("tile id {0} written more than once")]
    DuplicateTile(u64),

    /// Metadata could not be serialized.
    #[error("metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
