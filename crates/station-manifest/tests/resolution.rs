//! # Resolution Integration Tests
//!
//! End-to-end checks of manifest loading and resolution through the public
//! API, plus property tests for the latest-model ordering.

use proptest::prelude::*;
use station_manifest::resolve::{flatten_models, latest_model_revision};
use station_manifest::version::numeric_signature;
use station_manifest::{Manifest, ManifestError, ManifestSource, ManifestStore, Fetcher, RevisionSuffix};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A realistic manifest as published by the depot.
const PUBLISHED: &str = r#"{
    "manifest_version": "0.0.12",
    "manifest_date": "2025-06-21",
    "current_bootstrap": { "version": "v0.0.3" },
    "current_hypervisor": { "version": "v0.0.5" },
    "current_cli": { "version": "v0.0.2" },
    "models": {
        "2B": {
            "2025-01-09": { "model_name": "Moondream 2B", "revision": "2025-01-09" },
            "2025-04-14": { "model_name": "Moondream 2B" },
            "2025-04-14-4bit": { "model_name": "Moondream 2B int4" },
            "2025-04-14-4": { "model_name": "Moondream 2B plain" }
        },
        "0.5B": {
            "2024-12-05": { "model_name": "Moondream 0.5B" }
        }
    },
    "inference_clients": {
        "v0.0.9": { "url": "https://depot.example.com/ic/v0.0.9.tar.gz" },
        "v0.0.10": { "url": "https://depot.example.com/ic/v0.0.10.tar.gz" },
        "v0.0.2": { "url": "https://depot.example.com/ic/v0.0.2.tar.gz" }
    },
    "notes": ["Quantized weights are preferred when available."]
}"#;

struct Unreachable;

impl Fetcher for Unreachable {
    fn fetch(&self, url: &str, _dest: &Path) -> station_manifest::Result<()> {
        Err(ManifestError::Fetch {
            url: url.to_string(),
            message: "network unreachable".to_string(),
        })
    }
}

fn write_published(dir: &TempDir) -> String {
    let path = dir.path().join("manifest.json");
    fs::write(&path, PUBLISHED).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_published_manifest_resolution() {
    let dir = TempDir::new().unwrap();
    let location = write_published(&dir);

    let mut store = ManifestStore::new(location, dir.path().join("cache.json"), Box::new(Unreachable));
    assert_eq!(store.refresh().unwrap(), ManifestSource::Local);

    let manifest = store.manifest();
    assert_eq!(manifest.version(), "0.0.12");
    assert_eq!(manifest.current_cli()["version"], "v0.0.2");

    // [2025, 4, 14, 4] beats [2025, 4, 14]; the 4bit revision wins its group.
    let (revision, entry) = latest_model_revision(manifest).unwrap();
    assert_eq!(revision, "2025-04-14-4bit");
    assert_eq!(entry.model_name(), "Moondream 2B int4");

    let client = manifest.latest_inference_client().unwrap();
    assert_eq!(client.version, "v0.0.10");

    let found = manifest.get_model("2024-12-05", &RevisionSuffix).unwrap();
    assert_eq!(found.model_name, "Moondream 0.5B");
    assert_eq!(found.revision, "2024-12-05");
}

#[test]
fn test_empty_manifest_queries() {
    let manifest: Manifest = serde_json::from_str("{}").unwrap();

    assert!(manifest.latest_model().is_none());
    assert!(manifest.latest_inference_client().is_none());
    assert!(manifest.models().is_empty());
    assert!(manifest.inference_clients().is_empty());
    assert!(manifest.get_model("anything", &RevisionSuffix).is_none());
}

#[test]
fn test_unreachable_remote_keeps_previous_document() {
    let dir = TempDir::new().unwrap();
    let mut store = ManifestStore::new(
        "https://depot.example.com/manifest.json",
        dir.path().join("never-written.json"),
        Box::new(Unreachable),
    );
    store.replace(serde_json::from_str(PUBLISHED).unwrap());

    assert!(store.refresh().is_err());
    assert_eq!(store.manifest().version(), "0.0.12");
    assert!(store.manifest().latest_model().is_some());
}

fn revision_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,4}(-[0-9]{1,2}){0,3}",
        "[0-9]{4}-[0-9]{2}-[0-9]{2}-4bit",
        "[a-z]{1,6}(-[0-9]{1,3}){0,2}",
    ]
}

fn manifest_strategy() -> impl Strategy<Value = Manifest> {
    prop::collection::btree_map(
        "[0-9]{1,2}B",
        prop::collection::btree_map(revision_strategy(), Just(()), 1..6),
        1..4,
    )
    .prop_map(|families| {
        let models: serde_json::Map<String, serde_json::Value> = families
            .into_iter()
            .map(|(family, revisions)| {
                let entries = revisions
                    .into_keys()
                    .map(|rev| (rev.clone(), serde_json::json!({ "model_name": rev })))
                    .collect::<serde_json::Map<_, _>>();
                (family, serde_json::Value::Object(entries))
            })
            .collect();
        serde_json::from_value(serde_json::json!({ "models": models })).unwrap()
    })
}

proptest! {
    #[test]
    fn prop_latest_model_has_maximal_signature(manifest in manifest_strategy()) {
        let (chosen, _) = latest_model_revision(&manifest).unwrap();
        let chosen_sig = numeric_signature(chosen);

        for revision in flatten_models(&manifest).keys() {
            prop_assert!(chosen_sig >= numeric_signature(revision));
        }
    }

    #[test]
    fn prop_latest_model_is_deterministic(manifest in manifest_strategy()) {
        let first = latest_model_revision(&manifest).map(|(rev, _)| rev.to_string());
        let second = latest_model_revision(&manifest).map(|(rev, _)| rev.to_string());
        prop_assert_eq!(first, second);
    }
}
