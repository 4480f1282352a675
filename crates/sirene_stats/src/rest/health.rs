//! Health check endpoint

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::source::SnapshotOrigin;
use crate::state::AppState;

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "spark-api";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the process answers
    pub status: String,
    /// Service name
    pub service: String,
    /// Version
    pub version: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Snapshot cache state; absent until the first statistics request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStatus>,
}

/// Snapshot cache state
#[derive(Debug, Serialize)]
pub struct CacheStatus {
    /// Source that produced the current snapshot
    pub source: String,
    /// Whether the snapshot came from the primary source, the fallback, or neither
    pub origin: SnapshotOrigin,
    /// Number of records
    pub records: usize,
    /// When the snapshot was fetched
    pub fetched_at: DateTime<Utc>,
    /// Whether the snapshot is still within its time-to-live
    pub fresh: bool,
    /// Configured time-to-live in seconds
    pub ttl_seconds: u64,
}

/// Health check endpoint
///
/// GET /health
///
/// Reads the cache without refreshing it and needs no token.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ttl = state.cache.ttl();
    let cache = state.cache.peek().await.map(|snapshot| CacheStatus {
        source: snapshot.source().to_string(),
        origin: snapshot.origin(),
        records: snapshot.records().len(),
        fetched_at: snapshot.fetched_at(),
        fresh: snapshot.is_fresh(ttl),
        ttl_seconds: ttl.as_secs(),
    });

    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        cache,
    })
}
