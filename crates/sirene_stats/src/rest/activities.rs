//! Activity statistics endpoints

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use tracing::debug;

use super::BaseUrl;
use crate::auth::TokenInfo;
use crate::hydra::{self, Collection, Document, JsonLd, StatisticalMeasure};
use crate::query::{self, PageParams};
use crate::state::AppState;

/// Raw query-string pairs.
///
/// Values stay strings so that non-numeric input falls back to defaults
/// instead of rejecting the request. When a key is repeated only its first
/// value counts.
#[derive(Debug, Default, Clone)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// First value given for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Normalized pagination parameters (`page`, `pageSize`).
    pub fn page_params(&self) -> PageParams {
        PageParams::parse(self.first("page"), self.first("pageSize"))
    }

    /// Normalized ranking length (`limit`).
    pub fn limit(&self) -> usize {
        query::parse_limit(self.first("limit"))
    }

    /// Normalized bottom-ranking threshold (`min_count`).
    pub fn min_count(&self) -> i64 {
        query::parse_min_count(self.first("min_count"))
    }
}

impl From<Vec<(String, String)>> for QueryParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

fn caller(token: &TokenInfo) -> &str {
    token.client_id().unwrap_or("-")
}

/// List all activity codes
///
/// GET /stats/activites
pub async fn list_activities(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    BaseUrl(base_url): BaseUrl,
    Query(raw): Query<Vec<(String, String)>>,
) -> JsonLd<Collection<StatisticalMeasure>> {
    let params = QueryParams::from(raw).page_params();
    debug!(client_id = caller(&token), ?params, "List activities");

    let snapshot = state.cache.get().await;
    let page = query::list_all(snapshot.records(), params);
    let items: Vec<StatisticalMeasure> = page.items.iter().copied().map(Into::into).collect();

    JsonLd(hydra::paginated(items, page.total, params, &base_url))
}

/// Count for a single activity code
///
/// GET /stats/activites/{code}
pub async fn get_activity(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Path(code): Path<String>,
) -> JsonLd<Document<StatisticalMeasure>> {
    debug!(client_id = caller(&token), code = %code, "Get activity");

    let snapshot = state.cache.get().await;
    let stat = query::get_one(snapshot.records(), &code);

    JsonLd(Document::new(StatisticalMeasure::from(&stat)))
}

/// Activity codes starting with a prefix
///
/// GET /stats/activites/filter/{pattern}
pub async fn filter_activities(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    BaseUrl(base_url): BaseUrl,
    Path(pattern): Path<String>,
    Query(raw): Query<Vec<(String, String)>>,
) -> JsonLd<Collection<StatisticalMeasure>> {
    let params = QueryParams::from(raw).page_params();
    debug!(client_id = caller(&token), pattern = %pattern, ?params, "Filter activities");

    let snapshot = state.cache.get().await;
    let page = query::filter_by_prefix(snapshot.records(), &pattern, params);
    let items: Vec<StatisticalMeasure> = page.items.iter().copied().map(Into::into).collect();

    JsonLd(hydra::paginated(items, page.total, params, &base_url))
}

/// Most represented activity codes
///
/// GET /stats/top-activites
pub async fn top_activities(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Query(raw): Query<Vec<(String, String)>>,
) -> JsonLd<Collection<StatisticalMeasure>> {
    let limit = QueryParams::from(raw).limit();
    debug!(client_id = caller(&token), limit, "Top activities");

    let snapshot = state.cache.get().await;
    let items: Vec<StatisticalMeasure> = query::top(snapshot.records(), limit)
        .into_iter()
        .map(Into::into)
        .collect();

    JsonLd(hydra::unpaged(items))
}

/// Least represented activity codes
///
/// GET /stats/bottom-activites
pub async fn bottom_activities(
    State(state): State<AppState>,
    Extension(token): Extension<TokenInfo>,
    Query(raw): Query<Vec<(String, String)>>,
) -> JsonLd<Collection<StatisticalMeasure>> {
    let raw = QueryParams::from(raw);
    let limit = raw.limit();
    let min_count = raw.min_count();
    debug!(client_id = caller(&token), limit, min_count, "Bottom activities");

    let snapshot = state.cache.get().await;
    let items: Vec<StatisticalMeasure> = query::bottom(snapshot.records(), limit, min_count)
        .into_iter()
        .map(Into::into)
        .collect();

    JsonLd(hydra::unpaged(items))
}
