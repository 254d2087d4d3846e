//! # Manifest Store
//!
//! Owns the in-memory manifest and knows where it comes from. The configured
//! location is either a local file or an `http(s)://` URL:
//!
//! 1. A location that exists on disk, or that is not an HTTP(S) URL, is read
//!    directly.
//! 2. Otherwise it is downloaded to the cache path. When the download fails
//!    the previously cached copy, if one exists, is used instead.
//! 3. The resulting local file is parsed.
//!
//! Any failure along the way is logged and returned, and the in-memory
//! document stays at its last known good value. Callers in long running
//! sessions can therefore ignore the error and keep serving.

use crate::error::{ManifestError, Result};
use crate::fetch::{write_atomically, Fetcher};
use crate::models::Manifest;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Where the current in-memory manifest was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSource {
    /// The configured location is a local file.
    Local,
    /// Freshly downloaded into the cache path.
    Remote,
    /// Download failed; the existing cached copy was used.
    Cached,
}

/// Returns true if `location` should be read from disk rather than fetched.
pub fn is_local_location(location: &str) -> bool {
    Path::new(location).exists()
        || !(location.starts_with("http://") || location.starts_with("https://"))
}

/// Loads, refreshes and saves the manifest document.
pub struct ManifestStore {
    /// Configured URL or filesystem path.
    location: String,

    /// Where remote manifests are downloaded to.
    cache_path: PathBuf,

    /// Local file the current document was (or will be) read from.
    path: PathBuf,

    /// Last successfully loaded document.
    manifest: Manifest,

    fetcher: Box<dyn Fetcher>,
}

impl ManifestStore {
    /// Creates an empty store without touching the filesystem or network.
    pub fn new(
        location: impl Into<String>,
        cache_path: impl Into<PathBuf>,
        fetcher: Box<dyn Fetcher>,
    ) -> Self {
        let cache_path = cache_path.into();
        ManifestStore {
            location: location.into(),
            path: cache_path.clone(),
            cache_path,
            manifest: Manifest::default(),
            fetcher,
        }
    }

    /// Creates a store and performs an initial refresh.
    ///
    /// A failed refresh is logged and leaves the store empty.
    pub fn open(
        location: impl Into<String>,
        cache_path: impl Into<PathBuf>,
        fetcher: Box<dyn Fetcher>,
    ) -> Self {
        let mut store = Self::new(location, cache_path, fetcher);
        if let Err(e) = store.refresh() {
            warn!("Starting with an empty manifest: {}", e);
        }
        store
    }

    /// Re-resolves the configured location and reloads the document.
    pub fn refresh(&mut self) -> Result<ManifestSource> {
        let source = if is_local_location(&self.location) {
            debug!("Using local manifest from {}", self.location);
            self.path = PathBuf::from(&self.location);
            ManifestSource::Local
        } else {
            debug!(
                "Downloading manifest from {} to {}",
                self.location,
                self.cache_path.display()
            );
            self.path = self.cache_path.clone();

            match self.fetcher.fetch(&self.location, &self.cache_path) {
                Ok(()) => ManifestSource::Remote,
                Err(e) if self.cache_path.is_file() => {
                    error!("Error downloading manifest: {}", e);
                    warn!(
                        "Falling back to cached manifest at {}",
                        self.cache_path.display()
                    );
                    ManifestSource::Cached
                }
                Err(e) => {
                    error!("Error downloading manifest: {}", e);
                    return Err(e);
                }
            }
        };

        self.load_local()?;
        Ok(source)
    }

    /// Reloads the local copy, refreshing first if there is none yet.
    pub fn load(&mut self) -> Result<&Manifest> {
        if !self.path.exists() {
            self.refresh()?;
        } else {
            self.load_local()?;
        }
        Ok(&self.manifest)
    }

    fn load_local(&mut self) -> Result<()> {
        debug!("Loading manifest from {}", self.path.display());

        match read_manifest(&self.path) {
            Ok(manifest) => {
                self.manifest = manifest;
                Ok(())
            }
            Err(e) => {
                error!("Error loading manifest: {}", e);
                Err(e)
            }
        }
    }

    /// Writes the in-memory document back to the active local path.
    pub fn save(&self) -> Result<()> {
        let result = serialize_pretty(&self.manifest)
            .and_then(|bytes| write_atomically(&self.path, &bytes));

        if let Err(e) = &result {
            error!("Error saving manifest: {}", e);
        }
        result
    }

    /// Replaces the whole in-memory document.
    pub fn replace(&mut self, manifest: Manifest) {
        self.manifest = manifest;
    }

    /// The last successfully loaded document.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Configured URL or path.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Local file backing the current document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }
}

impl std::fmt::Debug for ManifestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestStore")
            .field("location", &self.location)
            .field("path", &self.path)
            .field("manifest_version", &self.manifest.version())
            .finish()
    }
}

/// Reads and parses a manifest file.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ManifestError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn serialize_pretty(manifest: &Manifest) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    manifest.serialize(&mut serializer)?;
    Ok(bytes)
}
