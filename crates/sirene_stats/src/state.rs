//! The shared application state for the statistics API server.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenValidator;
use crate::error::Result;
use crate::server::StatsConfig;
use crate::source::SnapshotCache;

/// The shared state accessible by all API handlers.
///
/// Cloning is cheap: every component sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Cached activity dataset.
    pub cache: Arc<SnapshotCache>,
    /// Bearer token validator used by the auth middleware.
    pub validator: Arc<TokenValidator>,
    /// When the state was created.
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new `AppState` from already-built components.
    pub fn new(cache: SnapshotCache, validator: TokenValidator) -> Self {
        Self {
            cache: Arc::new(cache),
            validator: Arc::new(validator),
            started_at: Instant::now(),
        }
    }

    /// Creates a new `AppState` wired according to `config`.
    pub fn from_config(config: &StatsConfig) -> Result<Self> {
        let validator = TokenValidator::new(config.introspection.clone())?;
        Ok(Self::new(config.source.build_cache(), validator))
    }

    /// Seconds elapsed since the state was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
