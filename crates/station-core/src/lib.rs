//! # Moondream Station Core
//!
//! Release management facade for a Moondream Station install.
//! Combines manifest resolution and installation integrity checks behind one
//! configured [`Station`].
//!
//! ## Responsibilities
//!
//! | Concern | Component | Answers |
//! |---------|-----------|---------|
//! | Release selection | `station-manifest` | Which model and inference client are newest? |
//! | Installation health | `station-integrity` | Is every shipped file present and unmodified? |
//! | Configuration | [`StationConfig`] | Where is the manifest, what does a scan skip? |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       STATION CORE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │                    ┌─────────────────┐                      │
//! │   StationConfig ─▶ │     Station     │  ← Unified Facade    │
//! │                    └────────┬────────┘                      │
//! │                             │                               │
//! │              ┌──────────────┴──────────────┐                │
//! │              ▼                             ▼                │
//! │     ┌─────────────────┐          ┌─────────────────┐        │
//! │     │  ManifestStore  │          │ ChecksumBuilder │        │
//! │     │  + resolution   │          │   + Verifier    │        │
//! │     └─────────────────┘          └─────────────────┘        │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use station_core::{Station, StationConfig};
//! use std::path::Path;
//!
//! let config = StationConfig::from_file(Path::new("station.toml"))?;
//! let mut station = Station::new(config)?;
//! station.refresh_manifest()?;
//!
//! if let Some(client) = station.latest_inference_client() {
//!     println!("inference client {}", client.version);
//! }
//! # Ok::<(), station_core::StationError>(())
//! ```
//!
//! ## Logging
//!
//! All crates emit `tracing` events and never install a subscriber; the
//! embedding binary decides where diagnostics go.

mod config;
mod error;
mod station;

pub use config::{IntegrityConfig, ManifestConfig, StationConfig, DEFAULT_MANIFEST_URL};
pub use error::StationError;
pub use station::Station;

// Re-export component types for convenience
pub use station_integrity::{
    ChecksumManifest, HashAlgorithm, IgnoreRules, IntegrityError, VerificationResult,
};
pub use station_manifest::{
    Fetcher, LatestInferenceClient, Manifest, ManifestError, ManifestSource, ModelEntry,
    NameNormalizer, OfflineFetcher, ResolvedModel, RevisionSuffix,
};

/// Core result type for station operations.
pub type Result<T> = std::result::Result<T, StationError>;
