//! # SIRENE Stats - Activity Statistics API
//!
//! REST API serving aggregate counts of French legal units per main activity
//! code (NAF), as JSON-LD documents with Hydra paging.
//!
//! ## Features
//!
//! - **Hydra collections**: paged listings with `first`/`last`/`previous`/`next` links
//! - **Prefix filtering**: `/stats/activites/filter/62` matches every `62xxx` code
//! - **Rankings**: most and least represented activity codes
//! - **OAuth2 introspection**: every statistics route requires an active bearer token
//! - **Snapshot cache**: the upstream dataset is fetched at most once per TTL
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Statistics API Server                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐  ┌──────────────────┐                 │
//! │  │   /stats/*       │  │   /health        │                 │
//! │  └────────┬─────────┘  └────────┬─────────┘                 │
//! │           │                     │                            │
//! │  ┌────────▼─────────┐           │                            │
//! │  │  Token Validator │──▶ OAuth2 introspection               │
//! │  └────────┬─────────┘           │                            │
//! │           │                     │                            │
//! │  ┌────────▼─────────┐  ┌───────▼──────────┐                 │
//! │  │   Query Engine   │◀─│  Snapshot Cache  │──▶ Spark Connect│
//! │  └────────┬─────────┘  └──────────────────┘    (placeholder │
//! │           │                                      fallback)  │
//! │  ┌────────▼─────────┐                                        │
//! │  │  Hydra Envelope  │                                        │
//! │  └──────────────────┘                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sirene_stats::{StatsConfig, StatsServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = StatsServer::new(StatsConfig::public().with_port(3002))?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Example
//!
//! ```bash
//! curl "http://localhost:3002/stats/activites/filter/62?page=1&pageSize=5" \
//!   -H "Authorization: Bearer YOUR_TOKEN"
//! ```
//!
//! ```json
//! {
//!   "@context": { "@vocab": "https://schema.org/", "hydra": "http://www.w3.org/ns/hydra/core#" },
//!   "@type": "hydra:Collection",
//!   "totalItems": 2,
//!   "member": [
//!     { "@type": "StatisticalMeasure", "activitePrincipale": "6201Z", "count": 45230 },
//!     { "@type": "StatisticalMeasure", "activitePrincipale": "6202A", "count": 24300 }
//!   ],
//!   "view": {
//!     "@type": "hydra:PartialCollectionView",
//!     "@id": "http://localhost:3002/stats/activites/filter/62?page=1&pageSize=5",
//!     "first": "http://localhost:3002/stats/activites/filter/62?page=1&pageSize=5",
//!     "last": "http://localhost:3002/stats/activites/filter/62?page=1&pageSize=5"
//!   }
//! }
//! ```

pub mod auth;
pub mod error;
pub mod hydra;
pub mod query;
pub mod rest;
pub mod server;
pub mod source;
pub mod state;

pub use error::{Error, Result};
pub use server::{StatsConfig, StatsServer};
pub use state::AppState;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::auth::{IntrospectionConfig, TokenInfo, TokenValidator};
    pub use crate::error::{Error, Result};
    pub use crate::query::PageParams;
    pub use crate::server::{StatsConfig, StatsServer};
    pub use crate::source::{
        ActivitySource, ActivityStat, PlaceholderSource, SnapshotCache, SourceConfig, SourceKind,
    };
    pub use crate::state::AppState;
}
