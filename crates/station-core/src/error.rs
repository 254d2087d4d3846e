//! Error types for Station Core.

use station_integrity::IntegrityError;
use station_manifest::ManifestError;
use thiserror::Error;

/// Core error type for station operations.
#[derive(Debug, Error)]
pub enum StationError {
    /// Manifest loading, fetching or saving failed.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Checksum generation or loading failed.
    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
