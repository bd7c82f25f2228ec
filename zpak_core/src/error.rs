use std::path::PathBuf;

/// Errors surfaced by the archive container, serializer, and codec layers.
///
/// The core never swallows an error: every fallible operation propagates one
/// of these variants to its caller rather than logging-and-continuing.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("checksum mismatch for entry {path:?}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        path: String,
        expected: u32,
        actual: u32,
    },

    #[error("unsupported manifest version {0} (only version 1 is supported)")]
    UnsupportedManifestVersion(u32),

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("unknown algorithm '{0}'")]
    AlgorithmNotFound(String),

    #[error("extraction path escapes output directory: {0}")]
    UnsafeExtractionPath(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
