//! Network boundary for manifest downloads.
//!
//! The store only needs "put the bytes at this URL into this file". Retry,
//! backoff and conditional requests are out of scope; callers that need a
//! deadline configure it on the [`HttpFetcher`].

use crate::error::{ManifestError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Default overall timeout for a manifest download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads a remote document to a local file.
pub trait Fetcher {
    /// Fetches `url` and writes the body to `dest`.
    ///
    /// On error `dest` must be left as it was.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Plain HTTP(S) GET fetcher backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Builds a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(15)))
            .timeout(timeout)
            .build()
            .map_err(|e| ManifestError::Fetch {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Fetching {}", url);

        let fetch_error = |message: String| ManifestError::Fetch {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP status {status}")));
        }

        let bytes = response.bytes().map_err(|e| fetch_error(e.to_string()))?;
        debug!("Received {} bytes from {}", bytes.len(), url);

        write_atomically(dest, &bytes)?;
        info!("Downloaded to {}", dest.display());
        Ok(())
    }
}

/// Fetcher that refuses every download.
///
/// For callers that only work on local files and must not depend on an
/// HTTP client being constructible.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

impl Fetcher for OfflineFetcher {
    fn fetch(&self, url: &str, _dest: &Path) -> Result<()> {
        Err(ManifestError::Fetch {
            url: url.to_string(),
            message: "network access disabled".to_string(),
        })
    }
}

/// Writes `bytes` to a sibling temporary file and renames it over `dest`,
/// so readers never observe a half-written document.
pub fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(bytes)?;
    staged.flush()?;
    staged.persist(dest).map_err(|e| ManifestError::Io(e.error))?;
    Ok(())
}
