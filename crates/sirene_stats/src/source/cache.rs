//! Time-to-live snapshot cache in front of an [`ActivitySource`]
//!
//! The cache holds one immutable [`Snapshot`] behind an `Arc`. Readers clone
//! the `Arc` and never see a partially built dataset; a refresh builds a
//! complete new snapshot and swaps it in.
//!
//! At most one refresh runs at a time. Requests that miss the cache while a
//! refresh is in flight wait for it and then reuse its result instead of
//! issuing their own upstream call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{ActivitySource, ActivityStat, PlaceholderSource};

/// Default time-to-live of a snapshot.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Where the records of a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOrigin {
    /// The primary source answered
    Primary,
    /// The primary source failed and the fallback answered
    Fallback,
    /// Every source failed; the snapshot holds no records
    Empty,
}

/// An immutable copy of the dataset.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Vec<ActivityStat>,
    source: &'static str,
    origin: SnapshotOrigin,
    fetched_at: DateTime<Utc>,
    fetched: Instant,
}

impl Snapshot {
    fn new(records: Vec<ActivityStat>, source: &'static str, origin: SnapshotOrigin) -> Self {
        Self {
            records,
            source,
            origin,
            fetched_at: Utc::now(),
            fetched: Instant::now(),
        }
    }

    /// Records in source order.
    pub fn records(&self) -> &[ActivityStat] {
        &self.records
    }

    /// Name of the source that produced the records.
    pub fn source(&self) -> &'static str {
        self.source
    }

    /// How the snapshot was obtained.
    pub fn origin(&self) -> SnapshotOrigin {
        self.origin
    }

    /// Wall-clock time of the fetch.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Time elapsed since the fetch.
    pub fn age(&self) -> Duration {
        self.fetched.elapsed()
    }

    /// Whether the snapshot is younger than `ttl`.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Shared, single-flight snapshot cache.
pub struct SnapshotCache {
    primary: Arc<dyn ActivitySource>,
    fallback: Option<Arc<dyn ActivitySource>>,
    ttl: Duration,
    current: RwLock<Option<Arc<Snapshot>>>,
    refresh_lock: Mutex<()>,
}

impl SnapshotCache {
    /// Create a cache over `primary` with no fallback and the default TTL.
    pub fn new(primary: Arc<dyn ActivitySource>) -> Self {
        Self {
            primary,
            fallback: None,
            ttl: DEFAULT_CACHE_TTL,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Cache serving only the built-in placeholder dataset.
    pub fn placeholder() -> Self {
        Self::new(Arc::new(PlaceholderSource::new()))
    }

    /// Source used when the primary fails.
    pub fn with_fallback(mut self, fallback: Arc<dyn ActivitySource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Set the snapshot time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the current snapshot, refreshing it first if missing or stale.
    pub async fn get(&self) -> Arc<Snapshot> {
        if let Some(snapshot) = self.fresh().await {
            debug!(source = snapshot.source(), "Using cached activity data");
            return snapshot;
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited for the lock.
        if let Some(snapshot) = self.fresh().await {
            return snapshot;
        }

        self.refresh_locked().await
    }

    /// Replace the snapshot unconditionally.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Return the current snapshot without refreshing it.
    pub async fn peek(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }

    async fn fresh(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|snapshot| snapshot.is_fresh(self.ttl))
            .cloned()
    }

    /// Must be called with `refresh_lock` held.
    async fn refresh_locked(&self) -> Arc<Snapshot> {
        let snapshot = Arc::new(self.load().await);

        info!(
            source = snapshot.source(),
            origin = ?snapshot.origin(),
            records = snapshot.records().len(),
            "Activity snapshot refreshed"
        );

        *self.current.write().await = Some(snapshot.clone());
        snapshot
    }

    async fn load(&self) -> Snapshot {
        let primary_error = match self.primary.fetch().await {
            Ok(records) => {
                return Snapshot::new(records, self.primary.name(), SnapshotOrigin::Primary)
            }
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            warn!("{}; serving an empty dataset", primary_error);
            return Snapshot::new(Vec::new(), self.primary.name(), SnapshotOrigin::Empty);
        };

        warn!(
            "{}; using {} data instead",
            primary_error,
            fallback.name()
        );

        match fallback.fetch().await {
            Ok(records) => Snapshot::new(records, fallback.name(), SnapshotOrigin::Fallback),
            Err(e) => {
                warn!("Fallback source failed: {}; serving an empty dataset", e);
                Snapshot::new(Vec::new(), fallback.name(), SnapshotOrigin::Empty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    impl CountingSource {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
                delay: Duration::ZERO,
            })
        }

        /// Source that stays inside `fetch` for `delay`.
        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ActivitySource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch(&self) -> Result<Vec<ActivityStat>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                Err(Error::SourceUnavailable("down".into()))
            } else {
                Ok(vec![ActivityStat::new("6201Z", 10)])
            }
        }
    }

    #[tokio::test]
    async fn test_empty_until_first_get() {
        let cache = SnapshotCache::placeholder();
        assert!(cache.peek().await.is_none());

        let snapshot = cache.get().await;
        assert_eq!(snapshot.records().len(), 20);
        assert_eq!(snapshot.origin(), SnapshotOrigin::Primary);
        assert!(cache.peek().await.is_some());
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let source = CountingSource::new(false);
        let cache = SnapshotCache::new(source.clone());

        let first = cache.get().await;
        let second = cache.get().await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_snapshot_is_replaced() {
        let source = CountingSource::new(false);
        let cache = SnapshotCache::new(source.clone()).with_ttl(Duration::ZERO);

        let first = cache.get().await;
        let second = cache.get().await;

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_forced_refresh() {
        let source = CountingSource::new(false);
        let cache = SnapshotCache::new(source.clone());

        cache.get().await;
        cache.refresh().await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_fallback_is_cached() {
        let primary = CountingSource::new(true);
        let cache = SnapshotCache::new(primary.clone())
            .with_fallback(Arc::new(PlaceholderSource::new()));

        let first = cache.get().await;
        assert_eq!(first.origin(), SnapshotOrigin::Fallback);
        assert_eq!(first.source(), "placeholder");
        assert_eq!(first.records().len(), 20);

        let second = cache.get().await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_without_fallback() {
        let cache = SnapshotCache::new(CountingSource::new(true));
        let snapshot = cache.get().await;
        assert_eq!(snapshot.origin(), SnapshotOrigin::Empty);
        assert!(snapshot.records().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_share_one_refresh() {
        let source = CountingSource::slow(Duration::from_millis(100));
        let cache = Arc::new(SnapshotCache::new(source.clone()));
        let start = Arc::new(tokio::sync::Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                let start = start.clone();
                tokio::spawn(async move {
                    start.wait().await;
                    cache.get().await
                })
            })
            .collect();

        let mut snapshots = Vec::new();
        for handle in handles {
            snapshots.push(handle.await.unwrap());
        }

        assert_eq!(source.calls(), 1);
        assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
    }
}
