//! The unified Station facade.
//!
//! [`Station`] wires the manifest store and the integrity engines to one
//! configuration so callers do not assemble fetchers, ignore rules and
//! normalizers themselves.

use crate::{config::StationConfig, Result};

use station_integrity::{
    log_outcome, save_checksums, ChecksumBuilder, ChecksumManifest, VerificationResult, Verifier,
};
use station_manifest::{
    Fetcher, HttpFetcher, LatestInferenceClient, Manifest, ManifestSource, ManifestStore,
    ModelEntry, NameNormalizer, OfflineFetcher, ResolvedModel, RevisionSuffix,
};

use std::path::Path;
use tracing::{debug, info};

/// Release management facade for a station install.
///
/// Owns one [`ManifestStore`], one [`ChecksumBuilder`] and one
/// [`Verifier`]. The manifest is not loaded on construction; call
/// [`Station::refresh_manifest`] or [`Station::load_manifest`] first.
///
/// # Example
///
/// ```rust,no_run
/// use station_core::{Station, StationConfig};
/// use std::path::Path;
///
/// let mut station = Station::new(StationConfig::default())?;
/// station.refresh_manifest()?;
///
/// if let Some((revision, model)) = station.latest_model() {
///     println!("{} ({})", model.model_name(), revision);
/// }
///
/// let result = station.validate_installation(
///     Path::new("/opt/station"),
///     Path::new("/opt/station/md_station_checksums.json"),
/// );
/// assert!(result.valid);
/// # Ok::<(), station_core::StationError>(())
/// ```
pub struct Station {
    config: StationConfig,
    store: ManifestStore,
    builder: ChecksumBuilder,
    verifier: Verifier,
    normalizer: Box<dyn NameNormalizer>,
}

impl Station {
    /// Creates a station that downloads manifests over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StationConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.manifest.fetch_timeout())?;
        Ok(Self::with_fetcher(config, Box::new(fetcher)))
    }

    /// Creates a station that never touches the network.
    ///
    /// Checksum generation and verification work as usual; a remote
    /// manifest location fails to refresh unless a cached copy exists.
    pub fn offline(config: StationConfig) -> Self {
        Self::with_fetcher(config, Box::new(OfflineFetcher))
    }

    /// Creates a station with a caller-supplied fetcher.
    pub fn with_fetcher(config: StationConfig, fetcher: Box<dyn Fetcher>) -> Self {
        let store = ManifestStore::new(
            config.manifest.url.clone(),
            config.manifest.cache_path.clone(),
            fetcher,
        );
        let builder = ChecksumBuilder::new(config.integrity.ignore_rules(), config.integrity.algorithm);
        let verifier = Verifier::new(config.integrity.algorithm);

        debug!(
            "Station configured for {} ({})",
            config.manifest.url, config.integrity.algorithm
        );

        Self {
            config,
            store,
            builder,
            verifier,
            normalizer: Box::new(RevisionSuffix),
        }
    }

    /// Replaces the model name normalizer used by [`Station::get_model`].
    pub fn with_normalizer(mut self, normalizer: impl NameNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    // =========================================================================
    // Manifest
    // =========================================================================

    /// Re-resolves the configured manifest location.
    ///
    /// On failure the previously loaded manifest stays in place.
    pub fn refresh_manifest(&mut self) -> Result<ManifestSource> {
        let source = self.store.refresh()?;
        info!(
            "Manifest {} loaded ({:?})",
            self.store.manifest().version(),
            source
        );
        Ok(source)
    }

    /// Reloads the local manifest copy, fetching it if there is none.
    pub fn load_manifest(&mut self) -> Result<&Manifest> {
        Ok(self.store.load()?)
    }

    /// Persists the current manifest to its local path.
    pub fn save_manifest(&self) -> Result<()> {
        Ok(self.store.save()?)
    }

    pub fn manifest(&self) -> &Manifest {
        self.store.manifest()
    }

    pub fn manifest_store(&self) -> &ManifestStore {
        &self.store
    }

    /// The newest model and its effective revision.
    pub fn latest_model(&self) -> Option<(&str, &ModelEntry)> {
        station_manifest::resolve::latest_model_revision(self.store.manifest())
    }

    pub fn latest_inference_client(&self) -> Option<LatestInferenceClient<'_>> {
        self.store.manifest().latest_inference_client()
    }

    /// Looks a model up by revision using the configured normalizer.
    pub fn get_model(&self, revision: &str) -> Option<ResolvedModel<'_>> {
        self.store.manifest().get_model(revision, self.normalizer.as_ref())
    }

    // =========================================================================
    // Integrity
    // =========================================================================

    /// Builds a checksum index of `root` with the configured rules.
    pub fn generate_checksums(&self, root: &Path) -> Result<ChecksumManifest> {
        Ok(self.builder.build(root)?)
    }

    /// Builds a checksum index of `root` and writes it to `output`.
    pub fn write_checksums(&self, root: &Path, output: &Path) -> Result<ChecksumManifest> {
        let index = self.builder.build(root)?;
        save_checksums(&index, output)?;
        Ok(index)
    }

    /// Verifies `root` against the checksum document at `expected_json`.
    ///
    /// Never fails: precondition problems are carried in the result. The
    /// outcome and every failing path are logged.
    pub fn validate_installation(&self, root: &Path, expected_json: &Path) -> VerificationResult {
        let result = self.verifier.validate_directory(root, expected_json);
        log_outcome(&result);
        result
    }

    /// Verifies `root` against an in-memory checksum index.
    pub fn verify_installation(&self, root: &Path, expected: &ChecksumManifest) -> VerificationResult {
        let result = self.verifier.verify(root, expected);
        log_outcome(&result);
        result
    }
}

impl std::fmt::Debug for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Station")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}
