//! Crate-level error returned to the binary

use thiserror::Error;

use crate::cache::CacheError;
use crate::cli::CliError;
use crate::config::ConfigError;
use crate::data::WeatherError;

/// The one error an invocation surfaces to its caller
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    /// A cache operation on the blocking pool panicked or was cancelled
    #[error("Cache task failed: {0}")]
    CacheTask(#[from] tokio::task::JoinError),

    /// No home directory to place the cache under
    #[error("Could not determine the cache directory (is $HOME set?)")]
    HomeDirUnavailable,
}

impl Error {
    /// True for both the lock-wait and the fetch timeouts
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Cache(CacheError::LockTimeout { .. }) | Error::Weather(WeatherError::Timeout(_))
        )
    }
}
