use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Failures reading or rewriting an index file. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Failed to read index {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse index {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize index {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write index {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failures extracting a palette from a single image. These never escape the resolver.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Extraction task failed: {0}")]
    Task(String),
}
