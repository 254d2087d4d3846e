//! Configuration types for Moondream Station.
//!
//! Loaded from TOML. Every section and field is optional; anything left out
//! takes its default.
//!
//! ```toml
//! [manifest]
//! url = "https://depot.moondream.ai/station/md_station_manifest_ubuntu.json"
//! cache_path = "data/manifest.json"
//! fetch_timeout_secs = 30
//!
//! [integrity]
//! ignore_extensions = [".log"]
//! algorithm = "sha256"
//! ```

use crate::error::StationError;
use crate::Result;
use serde::{Deserialize, Serialize};
use station_integrity::{HashAlgorithm, IgnoreRules, DEFAULT_IGNORE_DIRS, DEFAULT_IGNORE_FILES};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default published manifest location.
pub const DEFAULT_MANIFEST_URL: &str =
    "https://depot.moondream.ai/station/md_station_manifest_ubuntu.json";

/// Configuration for the Station facade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Manifest source settings.
    pub manifest: ManifestConfig,

    /// Checksum generation settings.
    pub integrity: IntegrityConfig,
}

impl StationConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `StationError::Config` if the file cannot be read or is not
    /// valid TOML for this schema.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            StationError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
            .map_err(|e| StationError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| StationError::Config(e.to_string()))
    }
}

/// Where the manifest comes from and where a downloaded copy is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Remote URL or local path of the manifest.
    pub url: String,

    /// Local file a downloaded manifest is written to.
    pub cache_path: PathBuf,

    /// Overall download timeout in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MANIFEST_URL.to_string(),
            cache_path: PathBuf::from("data/manifest.json"),
            fetch_timeout_secs: 30,
        }
    }
}

impl ManifestConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// What the checksum builder skips and how it hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    pub ignore_dirs: Vec<String>,
    pub ignore_files: Vec<String>,
    pub ignore_extensions: Vec<String>,
    pub algorithm: HashAlgorithm,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()).collect(),
            ignore_files: DEFAULT_IGNORE_FILES.iter().map(|s| s.to_string()).collect(),
            ignore_extensions: Vec::new(),
            algorithm: HashAlgorithm::default(),
        }
    }
}

impl IntegrityConfig {
    /// Ignore rules built from exactly the configured sets.
    pub fn ignore_rules(&self) -> IgnoreRules {
        IgnoreRules::none()
            .with_dirs(self.ignore_dirs.iter().cloned())
            .with_files(self.ignore_files.iter().cloned())
            .with_extensions(self.ignore_extensions.iter().cloned())
    }
}
