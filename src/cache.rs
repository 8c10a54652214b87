//! On-disk install cache keyed by version tag
//!
//! The cache root holds one directory per version tag with that version's
//! extracted bundle. The root is threaded explicitly through [`CacheStore`]
//! so tests can run against temporary roots. An existing tag directory is
//! trusted to match its tag's content; it is never re-verified.

use crate::archive;
use crate::error::{ZiplineError, ZiplineResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Handle to a cache root directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Open the cache at `root`, creating the directory if absent
    pub fn open(root: impl Into<PathBuf>) -> ZiplineResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| ZiplineError::io(format!("creating cache root {}", root.display()), e))?;
        Ok(Self { root })
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Install directory for a version tag (whether or not it exists)
    pub fn install_dir(&self, tag: &str) -> PathBuf {
        self.root.join(tag)
    }

    /// Install `payload` under `tag`, returning the install directory.
    ///
    /// When the tag directory already exists and `force` is false this is
    /// the idempotent fast path: no extraction, no re-verification. With
    /// `force`, or on first sight of the tag, any existing directory is
    /// replaced by a fresh extraction. A failed extraction removes the
    /// partial directory so it can never be reused as a valid install.
    pub fn install(&self, tag: &str, payload: &[u8], force: bool) -> ZiplineResult<PathBuf> {
        let dir = self.install_dir(tag);

        if dir.is_dir() && !force {
            debug!("Reusing cached install {}", dir.display());
            return Ok(dir);
        }

        if dir.exists() {
            fs::remove_dir_all(&dir)
                .map_err(|e| ZiplineError::io(format!("removing {}", dir.display()), e))?;
        }
        fs::create_dir_all(&dir)
            .map_err(|e| ZiplineError::io(format!("creating {}", dir.display()), e))?;

        debug!("Extracting bundle to {}", dir.display());
        if let Err(e) = archive::extract(payload, &dir) {
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                warn!("Failed to clean up partial install {}: {}", dir.display(), cleanup);
            }
            return Err(e);
        }

        Ok(dir)
    }

    /// Unconditionally delete the install directory for `tag`
    pub fn remove(&self, tag: &str) -> ZiplineResult<()> {
        let dir = self.install_dir(tag);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .map_err(|e| ZiplineError::io(format!("removing {}", dir.display()), e))?;
        }
        Ok(())
    }

    /// Remove all but the lexicographically greatest `keep` tag directories.
    ///
    /// Lexicographic order approximates recency; it is exact for
    /// time-ordered tags and arbitrary for digest-derived ones, an accepted
    /// weakness of the retention policy. Per-directory removal failures are
    /// logged and skipped. Returns the number of directories removed.
    pub fn evict(&self, keep: usize) -> ZiplineResult<usize> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| ZiplineError::io(format!("listing {}", self.root.display()), e))?;

        let mut tags: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        tags.sort();

        let excess = tags.len().saturating_sub(keep);
        let mut removed = 0;
        for tag in &tags[..excess] {
            let dir = self.root.join(tag);
            match fs::remove_dir_all(&dir) {
                Ok(()) => {
                    debug!("Evicted {}", dir.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to evict {}: {}", dir.display(), e),
            }
        }

        Ok(removed)
    }
}
