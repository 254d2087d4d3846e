//! # Checksum Document Storage
//!
//! Reads and writes checksum documents as JSON files.
//!
//! Documents are written with two-space indentation and keys in path
//! order, so a regenerated document for an unchanged tree is byte-identical
//! to the previous one.

use crate::models::{ChecksumManifest, IntegrityError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Loads a checksum document from disk.
///
/// # Errors
///
/// - `IntegrityError::NotFound` if the file does not exist
/// - `IntegrityError::Parse` if it is not a flat JSON object of strings
/// - `IntegrityError::Io` if it exists but cannot be read
pub fn load_checksums(path: &Path) -> Result<ChecksumManifest> {
    if !path.exists() {
        return Err(IntegrityError::NotFound(format!(
            "Expected JSON not found: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    let manifest: ChecksumManifest =
        serde_json::from_str(&content).map_err(|source| IntegrityError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    debug!("Loaded {} checksums from {}", manifest.len(), path.display());
    Ok(manifest)
}

/// Writes a checksum document, creating parent directories as needed.
pub fn save_checksums(manifest: &ChecksumManifest, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(path, json)?;

    info!("Wrote {} checksums to {}", manifest.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_format_is_sorted_two_space() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/checksums.json");
        let manifest: ChecksumManifest = [("z.txt", "2"), ("a.txt", "1")].into_iter().collect();

        save_checksums(&manifest, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"a.txt\": \"1\",\n  \"z.txt\": \"2\"\n}");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checksums.json");
        let manifest: ChecksumManifest = [("bin/run", "abc")].into_iter().collect();

        save_checksums(&manifest, &path).unwrap();
        assert_eq!(load_checksums(&path).unwrap(), manifest);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_checksums(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, IntegrityError::NotFound(_)));
    }

    #[test]
    fn test_load_rejects_non_string_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"a.txt": 42}"#).unwrap();

        let err = load_checksums(&path).unwrap_err();
        assert!(matches!(err, IntegrityError::Parse { .. }));
    }
}
