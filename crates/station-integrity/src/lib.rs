//! # Station Integrity - Installation Checksum Verification
//!
//! Captures the golden state of a release tree as a checksum document and
//! later proves that an installed copy still matches it.
//!
//! ## Purpose
//!
//! 1. **Index generation** - Walk a directory, prune ignored names, and map
//!    each remaining file's root-relative path to a content digest.
//!
//! 2. **Verification** - Compare a live directory against a stored index and
//!    enumerate every missing or modified file.
//!
//! ## Failure Modes Detected
//!
//! | Failure | Description | Reported as |
//! |---------|-------------|-------------|
//! | Partial install | Interrupted download or unpack | `missing` |
//! | Corruption | Truncated or bit-flipped file | `mismatched` |
//! | Tampering | File replaced after install | `mismatched` |
//! | Path escape | Entry pointing outside the root | `missing` |
//!
//! Files present on disk but absent from the index are not reported.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐   ChecksumManifest   ┌─────────────────────┐
//! │  CHECKSUM BUILDER  │ ───────────────────▶ │  storage (JSON)     │
//! │                    │                      │                     │
//! │  • walkdir walk    │                      │  sorted, 2-space    │
//! │  • prune ignores   │                      └──────────┬──────────┘
//! │  • md5 / sha256    │                                 │
//! └────────────────────┘                                 ▼
//!                                             ┌─────────────────────┐
//!                           live directory ─▶ │      VERIFIER       │
//!                                             │                     │
//!                                             │  missing/mismatched │
//!                                             │  VerificationResult │
//!                                             └─────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use station_integrity::{save_checksums, validate_directory, ChecksumBuilder};
//! use std::path::Path;
//!
//! let release = Path::new("./release");
//! let index = ChecksumBuilder::default().build(release).unwrap();
//! save_checksums(&index, Path::new("./checksums.json")).unwrap();
//!
//! let result = validate_directory(Path::new("/opt/station"), Path::new("./checksums.json"));
//! println!("{}", result.summary());
//! ```

pub mod builder;
pub mod hash;
pub mod models;
pub mod storage;
pub mod verify;

pub use builder::{ChecksumBuilder, IgnoreRules, DEFAULT_IGNORE_DIRS, DEFAULT_IGNORE_FILES};
pub use models::{ChecksumManifest, HashAlgorithm, IntegrityError, Result, VerificationResult};
pub use storage::{load_checksums, save_checksums};
pub use verify::{log_outcome, validate_directory, verify, Verifier};
