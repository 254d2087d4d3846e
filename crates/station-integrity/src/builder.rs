//! # Checksum Index Builder
//!
//! Captures the golden state of a release tree as a [`ChecksumManifest`].
//!
//! The tree is walked depth-first. Ignored directories are pruned before
//! descent, so nothing beneath them is ever read: a `.git` or
//! `node_modules` directory costs one name comparison regardless of size.
//! Ignored files are skipped by name or suffix. Files that cannot be read
//! (permissions, removed mid-walk) are skipped with a debug log; the
//! verifier will report them as missing.
//!
//! ## Ignore rules
//!
//! | Set | Matches | Example |
//! |-----|---------|---------|
//! | `dirs` | exact directory name, or `*suffix` | `.git`, `*.egg-info` |
//! | `files` | exact file name, or `*suffix` | `.DS_Store`, `*.pyc` |
//! | `extensions` | file name suffix | `.log`, `.tmp` |

use crate::hash::hash_file;
use crate::models::{ChecksumManifest, HashAlgorithm, IntegrityError, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Directory names skipped by default.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    ".venv",
    "__pycache__",
    "node_modules",
    ".pytest_cache",
    "py_versions",
];

/// File names skipped by default.
pub const DEFAULT_IGNORE_FILES: &[&str] = &["__init__.py", ".DS_Store", "Thumbs.db", ".gitignore"];

/// Names excluded from a checksum index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRules {
    pub dirs: BTreeSet<String>,
    pub files: BTreeSet<String>,
    pub extensions: BTreeSet<String>,
}

impl Default for IgnoreRules {
    fn default() -> Self {
        IgnoreRules {
            dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()).collect(),
            files: DEFAULT_IGNORE_FILES.iter().map(|s| s.to_string()).collect(),
            extensions: BTreeSet::new(),
        }
    }
}

impl IgnoreRules {
    /// Rules that ignore nothing.
    pub fn none() -> Self {
        IgnoreRules {
            dirs: BTreeSet::new(),
            files: BTreeSet::new(),
            extensions: BTreeSet::new(),
        }
    }

    pub fn with_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(extensions.into_iter().map(Into::into));
        self
    }

    /// Returns true if a directory with this name must not be descended into.
    pub fn ignores_dir(&self, name: &str) -> bool {
        matches_name(name, &self.dirs)
    }

    /// Returns true if a file with this name must not be hashed.
    pub fn ignores_file(&self, name: &str) -> bool {
        matches_name(name, &self.files)
            || self
                .extensions
                .iter()
                .any(|ext| !ext.is_empty() && name.ends_with(ext.as_str()))
    }
}

fn matches_name(name: &str, set: &BTreeSet<String>) -> bool {
    set.contains(name)
        || set
            .iter()
            .filter_map(|pattern| pattern.strip_prefix('*'))
            .any(|suffix| name.ends_with(suffix))
}

/// Builds checksum indexes for directory trees.
#[derive(Debug, Clone, Default)]
pub struct ChecksumBuilder {
    rules: IgnoreRules,
    algorithm: HashAlgorithm,
}

impl ChecksumBuilder {
    pub fn new(rules: IgnoreRules, algorithm: HashAlgorithm) -> Self {
        ChecksumBuilder { rules, algorithm }
    }

    pub fn rules(&self) -> &IgnoreRules {
        &self.rules
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hashes every non-ignored file under `root`.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::NotFound` if `root` is not a directory.
    /// Unreadable files and directories below the root are skipped.
    pub fn build(&self, root: &Path) -> Result<ChecksumManifest> {
        if !root.is_dir() {
            return Err(IntegrityError::NotFound(format!(
                "Directory not found: {}",
                root.display()
            )));
        }

        let mut manifest = ChecksumManifest::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !self.rules.ignores_dir(&entry.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            // Follows symlinks to files; symlinked directories are not walked.
            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if self.rules.ignores_file(&name) {
                continue;
            }

            let Some(rel_path) = relative_key(root, entry.path()) else {
                continue;
            };

            match hash_file(entry.path(), self.algorithm) {
                Ok(digest) => manifest.insert(rel_path, digest),
                Err(e) => debug!("Skipping {}: {}", entry.path().display(), e),
            }
        }

        info!(
            "Indexed {} files under {} ({})",
            manifest.len(),
            root.display(),
            self.algorithm
        );
        Ok(manifest)
    }
}

/// Root-relative path with forward slashes, regardless of host separator.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_default_rules() {
        let rules = IgnoreRules::default();
        assert!(rules.ignores_dir(".git"));
        assert!(rules.ignores_dir("__pycache__"));
        assert!(!rules.ignores_dir("git"));
        assert!(rules.ignores_file(".DS_Store"));
        assert!(!rules.ignores_file("main.py"));
    }

    #[test]
    fn test_glob_suffix_patterns() {
        let rules = IgnoreRules::none()
            .with_files(["*.pyc"])
            .with_dirs(["*.egg-info"]);

        assert!(rules.ignores_file("module.cpython-311.pyc"));
        assert!(!rules.ignores_file("module.py"));
        assert!(rules.ignores_dir("station.egg-info"));
    }

    #[test]
    fn test_extension_rules() {
        let rules = IgnoreRules::none().with_extensions([".log", ""]);
        assert!(rules.ignores_file("debug.log"));
        assert!(!rules.ignores_file("weights.bin"));
    }

    #[test]
    fn test_build_uses_forward_slash_keys() {
        let dir = tree(&[("a.txt", "a"), ("nested/deep/b.txt", "b")]);

        let manifest = ChecksumBuilder::default().build(dir.path()).unwrap();
        let paths: Vec<_> = manifest.paths().collect();
        assert_eq!(paths, vec!["a.txt", "nested/deep/b.txt"]);
    }

    #[test]
    fn test_build_prunes_ignored_dirs() {
        let dir = tree(&[
            ("keep.txt", "k"),
            (".git/config", "c"),
            (".git/objects/ab/cdef", "o"),
            ("sub/node_modules/pkg/index.js", "j"),
        ]);

        let manifest = ChecksumBuilder::default().build(dir.path()).unwrap();
        assert_eq!(manifest.len(), 1);
        assert!(manifest.contains("keep.txt"));
    }

    #[test]
    fn test_ignore_dir_rule_does_not_match_files() {
        let dir = tree(&[("node_modules", "a file, not a directory")]);

        let manifest = ChecksumBuilder::default().build(dir.path()).unwrap();
        assert!(manifest.contains("node_modules"));
    }

    #[test]
    fn test_build_skips_ignored_files() {
        let dir = tree(&[
            ("pkg/__init__.py", ""),
            ("pkg/core.py", "x = 1"),
            ("run.log", "noise"),
        ]);

        let builder = ChecksumBuilder::new(
            IgnoreRules::default().with_extensions([".log"]),
            HashAlgorithm::Md5,
        );
        let manifest = builder.build(dir.path()).unwrap();

        assert_eq!(manifest.paths().collect::<Vec<_>>(), vec!["pkg/core.py"]);
    }

    #[test]
    fn test_root_named_like_ignored_dir_is_still_walked() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join(".git");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("HEAD"), "ref").unwrap();

        let manifest = ChecksumBuilder::default().build(&root).unwrap();
        assert!(manifest.contains("HEAD"));
    }

    #[test]
    fn test_build_missing_root() {
        let err = ChecksumBuilder::default()
            .build(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, IntegrityError::NotFound(_)));
    }

    #[test]
    fn test_build_uses_configured_algorithm() {
        let dir = tree(&[("a.txt", "hello world")]);

        let md5 = ChecksumBuilder::new(IgnoreRules::none(), HashAlgorithm::Md5)
            .build(dir.path())
            .unwrap();
        let sha = ChecksumBuilder::new(IgnoreRules::none(), HashAlgorithm::Sha256)
            .build(dir.path())
            .unwrap();

        assert_eq!(md5.get("a.txt").unwrap().len(), 32);
        assert_eq!(sha.get("a.txt").unwrap().len(), 64);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tree(&[("ok.txt", "ok"), ("secret.txt", "s")]);
        let secret = dir.path().join("secret.txt");
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; only assert when the read really fails.
        let readable = fs::File::open(&secret).is_ok();
        let manifest = ChecksumBuilder::default().build(dir.path()).unwrap();

        assert!(manifest.contains("ok.txt"));
        assert_eq!(manifest.contains("secret.txt"), readable);
    }
}
