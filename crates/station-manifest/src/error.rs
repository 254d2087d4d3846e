//! Error types for manifest loading and persistence.
//!
//! Resolution queries never produce these: they are pure reads over an
//! already loaded document and report absence with `None`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for manifest operations.
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Errors that can occur while obtaining, parsing or saving a manifest.
///
/// The [`ManifestStore`](crate::ManifestStore) logs every one of these and
/// keeps its last known good document, so callers may treat them as
/// diagnostics rather than fatal conditions.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The local manifest file does not exist.
    #[error("manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The manifest file exists but is not a valid manifest document.
    #[error("failed to parse manifest {}: {source}", path.display())]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Downloading the remote manifest failed.
    ///
    /// The previously cached copy, if any, is left untouched.
    #[error("failed to fetch manifest from {url}: {message}")]
    Fetch {
        /// Remote location that was requested
        url: String,
        /// Transport or status description
        message: String,
    },

    /// Filesystem error while reading, writing or creating directories.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the in-memory manifest.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
