//! REST API endpoints
//!
//! ## Endpoints
//!
//! ### Statistics (Bearer token required)
//! - `GET /stats/activites?page&pageSize` - All activity codes by descending count
//! - `GET /stats/activites/{code}` - Count for one activity code
//! - `GET /stats/activites/filter/{pattern}?page&pageSize` - Codes starting with a prefix
//! - `GET /stats/top-activites?limit` - Most represented activity codes
//! - `GET /stats/bottom-activites?limit&min_count` - Least represented activity codes
//!
//! ### Health
//! - `GET /health` - Liveness and cache status

mod activities;
mod base_url;
mod health;

pub use activities::*;
pub use base_url::BaseUrl;
pub use health::*;

use crate::auth::auth_middleware;
use crate::state::AppState;
use axum::{middleware, routing::get, Router};

/// Create REST API router
pub fn router(state: &AppState) -> Router<AppState> {
    let stats = Router::new()
        .route("/stats/activites", get(activities::list_activities))
        .route("/stats/activites/{code}", get(activities::get_activity))
        .route(
            "/stats/activites/filter/{pattern}",
            get(activities::filter_activities),
        )
        .route("/stats/top-activites", get(activities::top_activities))
        .route("/stats/bottom-activites", get(activities::bottom_activities))
        .route_layer(middleware::from_fn_with_state(
            state.validator.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(stats)
}
