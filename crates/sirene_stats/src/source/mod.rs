//! Activity data sources
//!
//! A source produces the full list of `(activity code, count)` records in one
//! go. The [`SnapshotCache`] sits in front of the configured source and is the
//! only thing request handlers talk to.
//!
//! ## Sources
//!
//! - [`SparkConnectSource`]: the upstream distributed engine
//! - [`PlaceholderSource`]: a fixed development dataset, also used as the
//!   fallback whenever the upstream engine cannot be reached

mod cache;
mod placeholder;
mod spark;

pub use cache::{Snapshot, SnapshotCache, SnapshotOrigin, DEFAULT_CACHE_TTL};
pub use placeholder::PlaceholderSource;
pub use spark::{SparkConnectSource, DEFAULT_CONNECT_TIMEOUT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

/// Aggregate count of legal units for one activity classification code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityStat {
    /// Activity code (e.g. `6201Z`)
    pub code: String,
    /// Number of legal units registered under the code
    pub count: u64,
}

impl ActivityStat {
    /// Create a new record
    pub fn new(code: impl Into<String>, count: u64) -> Self {
        Self {
            code: code.into(),
            count,
        }
    }
}

/// A provider of complete activity datasets.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Short name used in logs and health output.
    fn name(&self) -> &'static str;

    /// Fetch the full dataset.
    ///
    /// Fails with [`Error::SourceUnavailable`] when no data can be produced
    /// within the source's bounded wait.
    async fn fetch(&self) -> Result<Vec<ActivityStat>>;
}

/// Which source the cache should treat as primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Spark Connect, falling back to placeholder data
    #[default]
    Spark,
    /// Placeholder data only
    Placeholder,
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spark" => Ok(SourceKind::Spark),
            "placeholder" | "mock" => Ok(SourceKind::Placeholder),
            other => Err(Error::Config(format!("Unknown data source: {}", other))),
        }
    }
}

/// Settings for the data source and its cache.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Primary source
    pub kind: SourceKind,
    /// Spark Connect host
    pub spark_host: String,
    /// Spark Connect port
    pub spark_port: u16,
    /// Bound on the Spark Connect connection wait
    pub connect_timeout: Duration,
    /// Snapshot time-to-live
    pub cache_ttl: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Spark,
            spark_host: "spark".to_string(),
            spark_port: 15002,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl SourceConfig {
    /// Build the snapshot cache described by this configuration.
    pub fn build_cache(&self) -> SnapshotCache {
        let cache = match self.kind {
            SourceKind::Spark => {
                let spark = SparkConnectSource::new(self.spark_host.clone(), self.spark_port)
                    .with_connect_timeout(self.connect_timeout);
                SnapshotCache::new(Arc::new(spark))
                    .with_fallback(Arc::new(PlaceholderSource::new()))
            }
            SourceKind::Placeholder => SnapshotCache::placeholder(),
        };
        cache.with_ttl(self.cache_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_config() {
        let config = SourceConfig {
            kind: SourceKind::Placeholder,
            ..Default::default()
        };
        let cache = config.build_cache();
        assert_eq!(cache.ttl(), DEFAULT_CACHE_TTL);

        let snapshot = cache.get().await;
        assert_eq!(snapshot.source(), "placeholder");
        assert_eq!(snapshot.origin(), SnapshotOrigin::Primary);
    }

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("spark".parse::<SourceKind>().unwrap(), SourceKind::Spark);
        assert_eq!(
            "Placeholder".parse::<SourceKind>().unwrap(),
            SourceKind::Placeholder
        );
        assert_eq!("mock".parse::<SourceKind>().unwrap(), SourceKind::Placeholder);
        assert!("mysql".parse::<SourceKind>().is_err());
    }
}
