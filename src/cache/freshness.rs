//! Freshness decision for the cached response
//!
//! Pure logic over already-collected metadata: no I/O, no locking, and the
//! clock is passed in so decisions are deterministic.

use chrono::{DateTime, Duration, Utc};

/// Fixed age after which a cached response is refetched.
///
/// The configured `CacheSeconds` value is not applied here.
pub const STALENESS_THRESHOLD_SECS: i64 = 5 * 60;

/// What the filesystem says about the cache file.
///
/// The file's own mtime is the only metadata; nothing is persisted separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetadata {
    /// Last modification time, `None` when the file is absent
    pub modified: Option<DateTime<Utc>>,
}

impl CacheMetadata {
    /// Metadata for a missing cache file
    pub fn absent() -> Self {
        Self { modified: None }
    }

    /// Metadata for a cache file last written at `modified`
    pub fn present(modified: DateTime<Utc>) -> Self {
        Self {
            modified: Some(modified),
        }
    }

    pub fn exists(&self) -> bool {
        self.modified.is_some()
    }
}

/// Outcome of the freshness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No cache file
    Absent,
    /// Cache file is young enough to serve
    Fresh,
    /// Cache file is older than the threshold
    Stale,
}

/// Decides between serving the cache and refetching
#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    threshold: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(Duration::seconds(STALENESS_THRESHOLD_SECS))
    }
}

impl FreshnessPolicy {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Classifies the cache at time `now`.
    ///
    /// An age exactly equal to the threshold is still fresh. An mtime in the
    /// future (clock skew) counts as fresh.
    pub fn decide(&self, meta: &CacheMetadata, now: DateTime<Utc>) -> Freshness {
        match meta.modified {
            None => Freshness::Absent,
            Some(modified) if now - modified > self.threshold => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_default_threshold_is_five_minutes() {
        let policy = FreshnessPolicy::default();
        assert_eq!(policy.threshold(), Duration::minutes(5));
    }

    #[test]
    fn test_absent_regardless_of_clock() {
        let policy = FreshnessPolicy::default();
        let meta = CacheMetadata::absent();

        for offset in [-10_000, -1, 0, 1, 300, 301, 1_000_000] {
            let now = base_time() + Duration::seconds(offset);
            assert_eq!(policy.decide(&meta, now), Freshness::Absent);
        }
    }

    #[test]
    fn test_fresh_within_threshold() {
        let policy = FreshnessPolicy::default();
        let meta = CacheMetadata::present(base_time());

        for age in [0, 1, 60, 299, 300] {
            let now = base_time() + Duration::seconds(age);
            assert_eq!(policy.decide(&meta, now), Freshness::Fresh, "age {}s", age);
        }
    }

    #[test]
    fn test_stale_past_threshold() {
        let policy = FreshnessPolicy::default();
        let meta = CacheMetadata::present(base_time());

        for age in [301, 600, 3600, 86_400] {
            let now = base_time() + Duration::seconds(age);
            assert_eq!(policy.decide(&meta, now), Freshness::Stale, "age {}s", age);
        }
    }

    #[test]
    fn test_boundary_uses_sub_second_precision() {
        let policy = FreshnessPolicy::default();
        let meta = CacheMetadata::present(base_time());

        let now = base_time() + Duration::seconds(300) + Duration::milliseconds(1);
        assert_eq!(policy.decide(&meta, now), Freshness::Stale);
    }

    #[test]
    fn test_future_mtime_is_fresh() {
        let policy = FreshnessPolicy::default();
        let meta = CacheMetadata::present(base_time() + Duration::hours(1));

        assert_eq!(policy.decide(&meta, base_time()), Freshness::Fresh);
    }

    #[test]
    fn test_custom_threshold() {
        let policy = FreshnessPolicy::new(Duration::seconds(30));
        let meta = CacheMetadata::present(base_time());

        assert_eq!(
            policy.decide(&meta, base_time() + Duration::seconds(30)),
            Freshness::Fresh
        );
        assert_eq!(
            policy.decide(&meta, base_time() + Duration::seconds(31)),
            Freshness::Stale
        );
    }

    #[test]
    fn test_metadata_exists() {
        assert!(!CacheMetadata::absent().exists());
        assert!(CacheMetadata::present(base_time()).exists());
    }
}
