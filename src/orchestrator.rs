//! End-to-end "get weather data"
//!
//! Stat the cache, classify it, then either read it or fetch and rewrite it.
//! Stale data is never served: both an absent and a stale cache trigger one
//! synchronous fetch, and a failed fetch aborts the call.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, FileLocker, Freshness, FreshnessPolicy, Locker};
use crate::data::Fetcher;
use crate::error::Error;

/// Composes the cache store, freshness policy and remote fetcher
#[derive(Debug)]
pub struct Orchestrator<F, L = FileLocker> {
    fetcher: F,
    store: CacheStore<L>,
    policy: FreshnessPolicy,
}

impl<F, L> Orchestrator<F, L>
where
    F: Fetcher,
    L: Locker + Clone + Send + Sync + 'static,
{
    pub fn new(fetcher: F, store: CacheStore<L>) -> Self {
        Self {
            fetcher,
            store,
            policy: FreshnessPolicy::default(),
        }
    }

    /// Replaces the default freshness policy
    pub fn with_policy(mut self, policy: FreshnessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &CacheStore<L> {
        &self.store
    }

    /// Returns the raw response body, from cache when fresh
    pub async fn get_weather_data(&self) -> Result<Vec<u8>, Error> {
        self.get_weather_data_at(Utc::now()).await
    }

    /// Same as [`get_weather_data`](Self::get_weather_data) with an explicit clock
    pub async fn get_weather_data_at(&self, now: DateTime<Utc>) -> Result<Vec<u8>, Error> {
        let meta = self.with_store(|store| store.stat()).await??;
        let freshness = self.policy.decide(&meta, now);
        debug!(?freshness, modified = ?meta.modified, "cache checked");

        if freshness == Freshness::Fresh {
            return Ok(self.with_store(|store| store.read()).await??);
        }

        info!(?freshness, "fetching current conditions");
        let bytes = self.fetcher.fetch().await?;

        // Persisting is best-effort; the fetched body is returned regardless
        let payload = bytes.clone();
        let written = self
            .with_store(move |store| store.write(&payload))
            .await
            .and_then(|result| result.map_err(Error::from));
        if let Err(e) = written {
            warn!(error = %e, "failed to update weather cache");
        }

        Ok(bytes)
    }

    /// Runs a store operation on tokio's blocking pool.
    ///
    /// Lock waits and file I/O block the calling thread, so they stay off the
    /// async workers.
    async fn with_store<T, Op>(&self, op: Op) -> Result<T, Error>
    where
        Op: FnOnce(&CacheStore<L>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        Ok(tokio::task::spawn_blocking(move || op(&store)).await?)
    }
}
