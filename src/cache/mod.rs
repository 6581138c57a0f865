//! Cache module for the last weather response
//!
//! One flat file per user and location holds the raw body of the last
//! successful response. Concurrent invocations coordinate through an advisory
//! lock on a sibling lock file: readers share, writers exclude. The freshness policy
//! decides from the file's mtime whether the cache can be served.

mod freshness;
mod lock;
mod store;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub use freshness::{CacheMetadata, Freshness, FreshnessPolicy, STALENESS_THRESHOLD_SECS};
pub use lock::{FileLock, FileLocker, LockMode, Locker, DEFAULT_LOCK_TIMEOUT};
pub use store::{location_key, CacheStore, CACHE_KEY_PREFIX};

#[cfg(test)]
pub(crate) use lock::testing;

/// Errors raised by the cache store and its locks
#[derive(Debug, Error)]
pub enum CacheError {
    /// Stat, open, read or write of the cache file failed
    #[error("Cache storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lock file could not be opened or locked
    #[error("Cache lock error at {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another invocation held the lock for longer than the wait bound
    #[error("Timed out after {}ms waiting for cache lock {}", waited.as_millis(), path.display())]
    LockTimeout { path: PathBuf, waited: Duration },
}
