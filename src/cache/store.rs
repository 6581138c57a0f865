//! On-disk store for the last successful weather response
//!
//! Each location gets its own cache file plus a sibling lock file, both named
//! from a key derived from the location. Every `read` and `write` takes and
//! drops its own lock; nothing is held across a fetch.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::freshness::CacheMetadata;
use super::lock::{FileLocker, LockMode, Locker};
use super::CacheError;

/// Stem shared by every cache key
pub const CACHE_KEY_PREFIX: &str = "conditions";

/// Builds the file stem used for one location's cache and lock files.
///
/// Characters outside `[A-Za-z0-9_-]` become `_`, so the key is always a
/// single path component.
pub fn location_key(state: &str, city: &str) -> String {
    let sanitize = |part: &str| -> String {
        part.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    };
    format!("{}_{}_{}", CACHE_KEY_PREFIX, sanitize(state), sanitize(city))
}

/// Reads and writes the cached response body under advisory locks
///
/// The cache lives in an XDG-compliant cache directory
/// (`~/.cache/ansiweather/` on Linux) as `<key>.json`, locked through
/// `<key>.lock`. The file holds raw response bytes, written only after the
/// provider answered 200 OK.
#[derive(Debug, Clone)]
pub struct CacheStore<L = FileLocker> {
    cache_dir: PathBuf,
    cache_path: PathBuf,
    temp_path: PathBuf,
    locker: L,
}

impl CacheStore<FileLocker> {
    /// Creates a store for `key` in the XDG cache directory.
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new(key: &str) -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "ansiweather")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf(), key))
    }

    /// Creates a store in a custom directory, locking with a file lock beside the cache
    pub fn with_dir(cache_dir: PathBuf, key: &str) -> Self {
        let locker = FileLocker::new(cache_dir.join(format!("{}.lock", key)));
        Self::with_locker(cache_dir, key, locker)
    }
}

impl<L: Locker> CacheStore<L> {
    /// Creates a store with a custom lock capability
    pub fn with_locker(cache_dir: PathBuf, key: &str, locker: L) -> Self {
        let cache_path = cache_dir.join(format!("{}.json", key));
        let temp_path = cache_dir.join(format!("{}.json.tmp", key));
        Self {
            cache_dir,
            cache_path,
            temp_path,
            locker,
        }
    }

    /// Path of the cache file
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Stats the cache file.
    ///
    /// A missing file is reported as absent metadata, not as an error.
    pub fn stat(&self) -> Result<CacheMetadata, CacheError> {
        match fs::metadata(&self.cache_path) {
            Ok(meta) => {
                let modified = meta.modified().map_err(|e| self.storage_error(e))?;
                Ok(CacheMetadata::present(DateTime::<Utc>::from(modified)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(CacheMetadata::absent()),
            Err(e) => Err(self.storage_error(e)),
        }
    }

    /// Reads the whole cache file under a shared lock.
    ///
    /// Fails with `CacheError::Storage` if the file vanished since it was stated.
    pub fn read(&self) -> Result<Vec<u8>, CacheError> {
        let _lock = self.locker.acquire(LockMode::Shared)?;
        let bytes = fs::read(&self.cache_path).map_err(|e| self.storage_error(e))?;
        debug!(bytes = bytes.len(), path = %self.cache_path.display(), "read weather cache");
        Ok(bytes)
    }

    /// Replaces the cache file content under an exclusive lock.
    ///
    /// The bytes go to an owner-only temp sibling that is synced and then
    /// renamed over the cache file. A failed write leaves the previous file
    /// and its mtime untouched.
    pub fn write(&self, bytes: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| self.storage_error(e))?;
        let _lock = self.locker.acquire(LockMode::Exclusive)?;

        if let Err(e) = self.write_temp(bytes) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(self.storage_error(e));
        }
        if let Err(e) = fs::rename(&self.temp_path, &self.cache_path) {
            let _ = fs::remove_file(&self.temp_path);
            return Err(self.storage_error(e));
        }

        debug!(bytes = bytes.len(), path = %self.cache_path.display(), "wrote weather cache");
        Ok(())
    }

    fn write_temp(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.temp_path)?;

        // `mode` only applies on creation; tighten a leftover temp file too
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(bytes)?;
        file.sync_all()
    }

    fn storage_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Storage {
            path: self.cache_path.clone(),
            source,
        }
    }
}
