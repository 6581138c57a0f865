//! Advisory locking for the cache file
//!
//! Readers take a shared lock and writers an exclusive one on a sibling lock
//! file. Only the lock state matters; the lock file stays empty.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::CacheError;

/// Default upper bound on how long a caller waits for the lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between attempts while the lock is contended
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Requested lock mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Any number of holders at once
    Shared,
    /// Single holder, excludes all other holders
    Exclusive,
}

/// A capability that hands out locks scoped to one cache operation
pub trait Locker {
    /// Held lock; released when dropped
    type Handle;

    /// Blocks until `mode` is granted or the wait bound is exceeded
    fn acquire(&self, mode: LockMode) -> Result<Self::Handle, CacheError>;
}

/// `Locker` backed by OS advisory locks on a lock file
#[derive(Debug, Clone)]
pub struct FileLocker {
    path: PathBuf,
    timeout: Duration,
}

impl FileLocker {
    /// Creates a locker for the given lock file path
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Overrides the lock wait bound
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> std::io::Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options.open(&self.path)
    }
}

impl Locker for FileLocker {
    type Handle = FileLock;

    fn acquire(&self, mode: LockMode) -> Result<FileLock, CacheError> {
        let file = self.open().map_err(|source| CacheError::Lock {
            path: self.path.clone(),
            source,
        })?;

        let start = Instant::now();
        loop {
            // Fully qualified so the fs2 methods win over std's inherent File locks
            let result = match mode {
                LockMode::Shared => FileExt::try_lock_shared(&file),
                LockMode::Exclusive => FileExt::try_lock_exclusive(&file),
            };

            match result {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    if start.elapsed() >= self.timeout {
                        return Err(CacheError::LockTimeout {
                            path: self.path.clone(),
                            waited: self.timeout,
                        });
                    }
                    trace!(?mode, "cache lock contended, retrying");
                    std::thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(source) => {
                    return Err(CacheError::Lock {
                        path: self.path.clone(),
                        source,
                    })
                }
            }
        }

        debug!(?mode, waited_ms = start.elapsed().as_millis() as u64, "cache lock acquired");
        Ok(FileLock { file, mode })
    }
}

/// A held advisory lock on the lock file
#[derive(Debug)]
pub struct FileLock {
    file: File,
    mode: LockMode,
}

impl FileLock {
    /// Mode this lock was granted in
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Releases the lock now instead of at end of scope
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
