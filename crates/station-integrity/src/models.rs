//! # Core Data Models for Integrity Verification
//!
//! Types shared by the checksum index builder and the verifier.
//!
//! ## Checksum document format
//!
//! A checksum document is a flat JSON object mapping root-relative,
//! forward-slash separated paths to lowercase hex digests:
//!
//! ```json
//! {
//!   "bin/inference": "9e107d9d372bb6826bd81d3542a419d6",
//!   "models/weights.safetensors": "e4d909c290d0fb1ca068ffaddf22cbd0"
//! }
//! ```
//!
//! Keys are unique and kept sorted so regenerated documents diff cleanly in
//! source control.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Content hashing scheme used for checksum documents.
///
/// MD5 is the default for compatibility with documents produced by earlier
/// releases. SHA-256 is available for new documents; the verifier tells the
/// two apart by digest length, so producer and consumer always agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl HashAlgorithm {
    /// Length of this algorithm's digest in hex characters.
    pub const fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha256 => 64,
        }
    }

    /// Infers the algorithm that produced a hex digest from its length.
    pub fn from_digest(digest: &str) -> Option<Self> {
        [HashAlgorithm::Md5, HashAlgorithm::Sha256]
            .into_iter()
            .find(|algorithm| algorithm.hex_len() == digest.len())
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => f.write_str("md5"),
            HashAlgorithm::Sha256 => f.write_str("sha256"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(IntegrityError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Expected installation state: relative path to hex digest.
///
/// Backed by a sorted map, so iteration and serialization are always in
/// path order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecksumManifest(BTreeMap<String, String>);

impl ChecksumManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the digest for a path, replacing any previous one.
    pub fn insert(&mut self, path: impl Into<String>, digest: impl Into<String>) {
        self.0.insert(path.into(), digest.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(path, digest)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, d)| (p.as_str(), d.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<BTreeMap<String, String>> for ChecksumManifest {
    fn from(map: BTreeMap<String, String>) -> Self {
        ChecksumManifest(map)
    }
}

impl<P: Into<String>, D: Into<String>> FromIterator<(P, D)> for ChecksumManifest {
    fn from_iter<I: IntoIterator<Item = (P, D)>>(iter: I) -> Self {
        ChecksumManifest(
            iter.into_iter()
                .map(|(p, d)| (p.into(), d.into()))
                .collect(),
        )
    }
}

/// Outcome of checking a directory against a checksum document.
///
/// Only coverage of the expected set is reported: files on disk that the
/// document does not mention are ignored. Both lists are complete and in
/// document path order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Expected paths with no regular file on disk.
    pub missing: Vec<String>,

    /// Expected paths whose content hash differs.
    pub mismatched: Vec<String>,

    /// True iff nothing is missing or mismatched and no precondition failed.
    pub valid: bool,

    /// Number of entries in the expected document.
    pub total_expected: usize,

    /// `total_expected - missing.len()`.
    pub found: usize,

    /// Set when verification could not run at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    /// Builds a result from the classified path lists.
    pub fn from_findings(total_expected: usize, missing: Vec<String>, mismatched: Vec<String>) -> Self {
        VerificationResult {
            valid: missing.is_empty() && mismatched.is_empty(),
            found: total_expected.saturating_sub(missing.len()),
            total_expected,
            missing,
            mismatched,
            error: None,
        }
    }

    /// A result for a verification that could not start.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        VerificationResult {
            valid: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// One-line human readable outcome.
    pub fn summary(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Validation error: {error}");
        }
        if self.valid {
            return format!(
                "File validation PASSED: {}/{} files valid",
                self.found, self.total_expected
            );
        }

        let mut line = format!(
            "File validation FAILED: {}/{} files found",
            self.found, self.total_expected
        );
        if !self.missing.is_empty() {
            line.push_str(&format!(", {} missing", self.missing.len()));
        }
        if !self.mismatched.is_empty() {
            line.push_str(&format!(", {} mismatched", self.mismatched.len()));
        }
        line
    }
}

/// Errors that can occur while building or loading checksum documents.
///
/// Per-file read failures during a scan are not errors: the file is skipped
/// and a verifier downstream reports it as missing.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// The root directory or checksum document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The checksum document is not a flat JSON object of strings.
    #[error("failed to parse checksum document {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    /// Filesystem error on a path that is required to exist.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize a checksum document.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unsupported hash algorithm name.
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Result type for integrity operations.
pub type Result<T> = std::result::Result<T, IntegrityError>;
