//! # Station Core Integration Tests
//!
//! Drive the facade from a TOML configuration file through manifest
//! resolution and installation checks, the way the binary does.

use station_core::{HashAlgorithm, ManifestSource, Station, StationConfig, StationError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write(root: &Path, rel: &str, content: &str) {
    let full = root.join(rel);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

fn station_from_toml(dir: &TempDir, toml: &str) -> Station {
    let config_path = dir.path().join("station.toml");
    fs::write(&config_path, toml).unwrap();
    let config = StationConfig::from_file(&config_path).unwrap();
    Station::new(config).unwrap()
}

// =============================================================================
// Manifest Resolution
// =============================================================================

#[test]
fn test_configured_local_manifest() {
    let dir = TempDir::new().unwrap();
    let manifest_path = dir.path().join("manifest.json");
    fs::write(
        &manifest_path,
        r#"{
            "manifest_version": "0.1.0",
            "manifest_date": "2025-07-01",
            "models": {
                "2B": { "2025-06-21": { "model_name": "Moondream 2B" } },
                "0.5B": { "2025-06-21-4bit": { "model_name": "Moondream 0.5B int4" } }
            },
            "inference_clients": { "v1.2.0": {}, "v1.10.0": {}, "v1.3.0": {} },
            "release_channel": "stable"
        }"#,
    )
    .unwrap();

    let toml = format!("[manifest]\nurl = {:?}\n", manifest_path.to_string_lossy());
    let mut station = station_from_toml(&dir, &toml);

    assert_eq!(station.refresh_manifest().unwrap(), ManifestSource::Local);
    assert_eq!(station.manifest().date(), "2025-07-01");

    let (revision, model) = station.latest_model().unwrap();
    assert_eq!(revision, "2025-06-21-4bit");
    assert_eq!(model.model_name(), "Moondream 0.5B int4");
    assert_eq!(station.latest_inference_client().unwrap().version, "v1.10.0");

    // Unknown top-level fields survive a save.
    station.save_manifest().unwrap();
    let saved = fs::read_to_string(&manifest_path).unwrap();
    assert!(saved.contains("\"release_channel\": \"stable\""));
}

#[test]
fn test_load_manifest_missing_local_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json");
    let cache = dir.path().join("cache.json");
    let toml = format!(
        "[manifest]\nurl = {:?}\ncache_path = {:?}\n",
        missing.to_string_lossy(),
        cache.to_string_lossy()
    );
    let mut station = station_from_toml(&dir, &toml);

    let err = station.load_manifest().unwrap_err();
    assert!(matches!(err, StationError::Manifest(_)));
    assert!(station.manifest().is_empty());
}

// =============================================================================
// Installation Integrity
// =============================================================================

#[test]
fn test_configured_ignores_apply_to_generation() {
    let dir = TempDir::new().unwrap();
    let install = dir.path().join("install");
    write(&install, "app/main.py", "run()");
    write(&install, "app/trace.log", "noise");
    write(&install, "cache/blob", "tmp");

    let station = station_from_toml(
        &dir,
        r#"
        [integrity]
        ignore_dirs = ["cache"]
        ignore_files = []
        ignore_extensions = [".log"]
        algorithm = "sha256"
        "#,
    );
    assert_eq!(station.config().integrity.algorithm, HashAlgorithm::Sha256);

    let index = station.generate_checksums(&install).unwrap();
    assert_eq!(index.paths().collect::<Vec<_>>(), vec!["app/main.py"]);
    assert_eq!(index.get("app/main.py").unwrap().len(), 64);
}

#[test]
fn test_generate_then_validate_after_damage() {
    let dir = TempDir::new().unwrap();
    let install = dir.path().join("install");
    write(&install, "a.txt", "alpha");
    write(&install, "b.txt", "beta");
    write(&install, "c.txt", "gamma");

    let station = station_from_toml(&dir, "");
    let expected = dir.path().join("checksums.json");
    station.write_checksums(&install, &expected).unwrap();

    write(&install, "a.txt", "ALPHA");
    fs::remove_file(install.join("c.txt")).unwrap();

    let result = station.validate_installation(&install, &expected);
    assert!(!result.valid);
    assert_eq!(result.missing, vec!["c.txt"]);
    assert_eq!(result.mismatched, vec!["a.txt"]);
    assert_eq!((result.found, result.total_expected), (2, 3));
}

#[test]
fn test_validate_without_expected_document() {
    let dir = TempDir::new().unwrap();
    let station = station_from_toml(&dir, "");

    let result = station.validate_installation(dir.path(), &dir.path().join("nope.json"));
    assert!(!result.valid);
    assert!(result.error.unwrap().contains("Expected JSON not found"));
}

#[test]
fn test_generate_missing_root_is_error() {
    let dir = TempDir::new().unwrap();
    let station = station_from_toml(&dir, "");

    let err = station.generate_checksums(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, StationError::Integrity(_)));
}
