//! # Manifest Data Model
//!
//! Strongly typed view of the station manifest document:
//!
//! ```text
//! {
//!   "manifest_version": "...", "manifest_date": "...",
//!   "current_bootstrap": {...}, "current_hypervisor": {...}, "current_cli": {...},
//!   "models": { "<family>": { "<entry key>": { "model_name": "...", "revision": "..." } } },
//!   "inference_clients": { "<version>": {...} },
//!   "notes": ["..."]
//! }
//! ```
//!
//! Every field is optional on the wire. Absent and `null` values both
//! deserialize to the empty value of their type, so accessors never have to
//! distinguish "missing" from "empty". Key order of every mapping is kept as
//! it appears in the document: resolution tie-breaks depend on it.
//!
//! Fields this crate does not model are carried through untouched, so a
//! load/save cycle does not drop data the server added. The `current_*`
//! sections are opaque: any JSON value is accepted in them. Empty sections
//! are not written back, so saving never adds keys the document lacked.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Opaque deployment metadata for one inference client release.
pub type InferenceClientEntry = IndexMap<String, Value>;

/// Model entries of one family, keyed by entry key.
pub type ModelFamily = IndexMap<String, ModelEntry>;

/// The manifest document.
///
/// Immutable once loaded: refreshing replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    manifest_version: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    manifest_date: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    current_bootstrap: IndexMap<String, Value>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    current_hypervisor: IndexMap<String, Value>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    current_cli: IndexMap<String, Value>,

    #[serde(
        default,
        deserialize_with = "deserialize_families",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    models: IndexMap<String, ModelFamily>,

    #[serde(
        default,
        deserialize_with = "null_entries_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    inference_clients: IndexMap<String, InferenceClientEntry>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    notes: Vec<String>,

    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

impl Manifest {
    /// Manifest document version, empty when absent.
    pub fn version(&self) -> &str {
        &self.manifest_version
    }

    /// Manifest publication date, empty when absent.
    pub fn date(&self) -> &str {
        &self.manifest_date
    }

    pub fn current_bootstrap(&self) -> &IndexMap<String, Value> {
        &self.current_bootstrap
    }

    pub fn current_hypervisor(&self) -> &IndexMap<String, Value> {
        &self.current_hypervisor
    }

    pub fn current_cli(&self) -> &IndexMap<String, Value> {
        &self.current_cli
    }

    /// All model families, in document order.
    pub fn models(&self) -> &IndexMap<String, ModelFamily> {
        &self.models
    }

    /// All declared inference clients keyed by version, in document order.
    pub fn inference_clients(&self) -> &IndexMap<String, InferenceClientEntry> {
        &self.inference_clients
    }

    /// Looks up one inference client by its exact version key.
    pub fn inference_client(&self, version: &str) -> Option<&InferenceClientEntry> {
        self.inference_clients.get(version)
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Top-level fields not modelled above.
    pub fn extra(&self) -> &IndexMap<String, Value> {
        &self.extra
    }

    /// Returns true if the manifest declares neither models nor clients.
    pub fn is_empty(&self) -> bool {
        self.models.values().all(IndexMap::is_empty) && self.inference_clients.is_empty()
    }
}

/// One downloadable model variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    model_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    revision: Option<String>,

    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

impl ModelEntry {
    pub fn new(model_name: impl Into<String>, revision: Option<String>) -> Self {
        ModelEntry {
            model_name: model_name.into(),
            revision,
            extra: IndexMap::new(),
        }
    }

    /// The stored model name, which may embed a revision suffix.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// The explicit `revision` field, if the entry declares one.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// The revision this entry is known by: its `revision` field, or the key
    /// it is stored under in its family when that field is absent.
    pub fn effective_revision<'a>(&'a self, key: &'a str) -> &'a str {
        self.revision.as_deref().unwrap_or(key)
    }

    /// Any other field of the entry (download URLs, sizes, ...).
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.extra.get(field)
    }
}

/// Result of looking a model up by revision.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel<'a> {
    /// Revision reported by name normalization, or the effective revision
    /// when the stored name carries none.
    pub revision: String,

    /// The matching entry.
    pub model: &'a ModelEntry,

    /// Canonical model name with any revision suffix removed.
    pub model_name: String,
}

/// The newest declared inference client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestInferenceClient<'a> {
    pub version: &'a str,
    pub entry: &'a InferenceClientEntry,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_entries_as_default<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let raw = Option::<IndexMap<String, Option<T>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

fn deserialize_families<'de, D>(deserializer: D) -> Result<IndexMap<String, ModelFamily>, D::Error>
where
    D: Deserializer<'de>,
{
    type RawFamilies = IndexMap<String, Option<IndexMap<String, Option<ModelEntry>>>>;

    let raw = Option::<RawFamilies>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(family, entries)| {
            let entries = entries
                .unwrap_or_default()
                .into_iter()
                .map(|(key, entry)| (key, entry.unwrap_or_default()))
                .collect();
            (family, entries)
        })
        .collect())
}
