//! # Station Manifest
//!
//! Decides which model and inference client release a station should run.
//! The authoritative answer lives in a remotely published JSON manifest that
//! may be stale or unreachable; this crate loads it with a local fallback and
//! resolves the "latest" entries from it deterministically.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`ManifestStore`] | Loads from a path or URL, caches, keeps last known good |
//! | [`Manifest`] | Typed document with empty-by-default accessors |
//! | [`resolve`] | Latest model / latest client / lookup by revision |
//! | [`version`] | Numeric signatures and version ordering |
//! | [`Fetcher`] | Network boundary, [`HttpFetcher`] for real use, [`OfflineFetcher`] for none |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use station_manifest::{HttpFetcher, ManifestStore, RevisionSuffix, DEFAULT_FETCH_TIMEOUT};
//!
//! let fetcher = HttpFetcher::new(DEFAULT_FETCH_TIMEOUT)?;
//! let store = ManifestStore::open(
//!     "https://depot.moondream.ai/station/md_station_manifest_ubuntu.json",
//!     "data/manifest.json",
//!     Box::new(fetcher),
//! );
//!
//! if let Some(model) = store.manifest().latest_model() {
//!     println!("latest model: {}", model.model_name());
//! }
//! if let Some(found) = store.manifest().get_model("2025-01-09", &RevisionSuffix) {
//!     println!("{} @ {}", found.model_name, found.revision);
//! }
//! # Ok::<(), station_manifest::ManifestError>(())
//! ```

mod error;
mod fetch;
mod models;
mod normalize;
pub mod resolve;
mod store;
pub mod version;

pub use error::{ManifestError, Result};
pub use fetch::{write_atomically, Fetcher, HttpFetcher, OfflineFetcher, DEFAULT_FETCH_TIMEOUT};
pub use models::{
    InferenceClientEntry, LatestInferenceClient, Manifest, ModelEntry, ModelFamily, ResolvedModel,
};
pub use normalize::{NameNormalizer, RevisionSuffix};
pub use resolve::FlatModel;
pub use store::{is_local_location, read_manifest, ManifestSource, ManifestStore};
