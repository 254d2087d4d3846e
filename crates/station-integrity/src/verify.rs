//! # Integrity Verifier
//!
//! Checks a live directory against a previously captured
//! [`ChecksumManifest`] and classifies every expected path as valid,
//! missing or mismatched.
//!
//! The check is one-directional: it proves the expected set is present and
//! intact, and says nothing about extra files on disk. Data problems never
//! raise; they are enumerated in full in the [`VerificationResult`]. Only a
//! missing precondition (no root directory, no readable expected document)
//! stops verification, and even that is carried in the result's `error`
//! field rather than returned as an `Err`.
//!
//! ## Classification
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | No regular file at `root/path` | missing |
//! | Path escapes the root (`..`, absolute) | missing |
//! | File present, digest differs or unreadable | mismatched |
//! | File present, digest equal | valid |
//!
//! Each expected digest is checked with the algorithm its length implies
//! (32 hex characters for MD5, 64 for SHA-256); digests of any other length
//! are checked with the verifier's default algorithm.

use crate::hash::hash_file;
use crate::models::{ChecksumManifest, HashAlgorithm, IntegrityError, VerificationResult};
use crate::storage::load_checksums;
use std::path::{Component, Path};
use tracing::{debug, info, warn};

/// Verifies directories against checksum documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier {
    default_algorithm: HashAlgorithm,
}

impl Verifier {
    pub fn new(default_algorithm: HashAlgorithm) -> Self {
        Verifier { default_algorithm }
    }

    /// Classifies every entry of `expected` against the files under `root`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use station_integrity::{ChecksumManifest, Verifier};
    /// use std::path::Path;
    ///
    /// let expected: ChecksumManifest =
    ///     [("bin/station", "5eb63bbbe01eeed093cb22bb8f5acdc3")].into_iter().collect();
    ///
    /// let result = Verifier::default().verify(Path::new("/opt/station"), &expected);
    /// if !result.valid {
    ///     eprintln!("missing: {:?}, mismatched: {:?}", result.missing, result.mismatched);
    /// }
    /// ```
    pub fn verify(&self, root: &Path, expected: &ChecksumManifest) -> VerificationResult {
        if !root.is_dir() {
            return VerificationResult::precondition_failed(format!(
                "Directory not found: {}",
                root.display()
            ));
        }

        let mut missing = Vec::new();
        let mut mismatched = Vec::new();

        for (rel_path, expected_digest) in expected.iter() {
            if !is_contained(rel_path) {
                warn!("Expected path escapes the root, treating as missing: {}", rel_path);
                missing.push(rel_path.to_string());
                continue;
            }

            let full_path = root.join(rel_path);
            if !full_path.is_file() {
                missing.push(rel_path.to_string());
                continue;
            }

            let algorithm =
                HashAlgorithm::from_digest(expected_digest).unwrap_or(self.default_algorithm);
            match hash_file(&full_path, algorithm) {
                Ok(actual) if actual.eq_ignore_ascii_case(expected_digest) => {}
                Ok(actual) => {
                    debug!(
                        "Hash mismatch for {}: expected {}, got {}",
                        rel_path, expected_digest, actual
                    );
                    mismatched.push(rel_path.to_string());
                }
                Err(e) => {
                    debug!("Cannot read {}: {}", full_path.display(), e);
                    mismatched.push(rel_path.to_string());
                }
            }
        }

        VerificationResult::from_findings(expected.len(), missing, mismatched)
    }

    /// Loads the expected document from `expected_json` and verifies `root`.
    ///
    /// An absent or malformed document, or an absent root, yields a result
    /// with `error` set and `valid == false`.
    pub fn validate_directory(&self, root: &Path, expected_json: &Path) -> VerificationResult {
        if !expected_json.exists() {
            return VerificationResult::precondition_failed(format!(
                "Expected JSON not found: {}",
                expected_json.display()
            ));
        }
        if !root.exists() {
            return VerificationResult::precondition_failed(format!(
                "Directory not found: {}",
                root.display()
            ));
        }

        match load_checksums(expected_json) {
            Ok(expected) => self.verify(root, &expected),
            Err(IntegrityError::NotFound(message)) => {
                VerificationResult::precondition_failed(message)
            }
            Err(e) => VerificationResult::precondition_failed(e.to_string()),
        }
    }
}

/// Verifies `root` against `expected` with the default verifier.
pub fn verify(root: &Path, expected: &ChecksumManifest) -> VerificationResult {
    Verifier::default().verify(root, expected)
}

/// Loads `expected_json` and verifies `root` with the default verifier.
pub fn validate_directory(root: &Path, expected_json: &Path) -> VerificationResult {
    Verifier::default().validate_directory(root, expected_json)
}

/// Emits the outcome of a verification, listing every failing path.
pub fn log_outcome(result: &VerificationResult) {
    if let Some(error) = &result.error {
        warn!("Validation error: {}", error);
        return;
    }

    if result.valid {
        info!("{}", result.summary());
        return;
    }

    warn!("{}", result.summary());
    if !result.missing.is_empty() {
        warn!("Missing files: {:?}", result.missing);
    }
    if !result.mismatched.is_empty() {
        warn!("Mismatched files: {:?}", result.mismatched);
    }
}

/// True if joining `rel_path` onto a root cannot leave that root.
fn is_contained(rel_path: &str) -> bool {
    !rel_path.is_empty()
        && Path::new(rel_path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
