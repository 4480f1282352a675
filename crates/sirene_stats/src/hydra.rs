//! JSON-LD documents with Hydra collection paging
//!
//! ## Shape
//!
//! ```json
//! {
//!   "@context": { "@vocab": "https://schema.org/", "hydra": "...", ... },
//!   "@type": "hydra:Collection",
//!   "totalItems": 45,
//!   "member": [ { "@type": "StatisticalMeasure", "activitePrincipale": "6201Z", "count": 45230 } ],
//!   "view": {
//!     "@type": "hydra:PartialCollectionView",
//!     "@id": "http://host/stats/activites?page=2&pageSize=20",
//!     "first": "http://host/stats/activites?page=1&pageSize=20",
//!     "last": "http://host/stats/activites?page=3&pageSize=20",
//!     "previous": "http://host/stats/activites?page=1&pageSize=20",
//!     "next": "http://host/stats/activites?page=3&pageSize=20"
//!   }
//! }
//! ```

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Error;
use crate::query::{PageParams, Ranked};
use crate::source::ActivityStat;

/// Media type of every statistics response.
pub const JSON_LD_CONTENT_TYPE: &str = "application/ld+json";

const COLLECTION_TYPE: &str = "hydra:Collection";
const VIEW_TYPE: &str = "hydra:PartialCollectionView";
const MEASURE_TYPE: &str = "StatisticalMeasure";

/// The `@context` shared by all documents.
pub fn context() -> Value {
    json!({
        "@vocab": "https://schema.org/",
        "activitePrincipale": "https://www.sirene.fr/sirene/public/variable/activitePrincipaleUniteLegale",
        "count": "https://schema.org/quantity",
        "hydra": "http://www.w3.org/ns/hydra/core#",
        "totalItems": "hydra:totalItems",
        "member": "hydra:member",
        "view": "hydra:view",
        "first": "hydra:first",
        "last": "hydra:last",
        "next": "hydra:next",
        "previous": "hydra:previous"
    })
}

/// One activity count as a `StatisticalMeasure` node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticalMeasure {
    #[serde(rename = "@type")]
    kind: &'static str,
    /// Activity code
    #[serde(rename = "activitePrincipale")]
    pub code: String,
    /// Number of legal units
    pub count: u64,
    /// Position in a ranking, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
}

impl StatisticalMeasure {
    /// Measure for a code and count.
    pub fn new(code: impl Into<String>, count: u64) -> Self {
        Self {
            kind: MEASURE_TYPE,
            code: code.into(),
            count,
            rank: None,
        }
    }
}

impl From<&ActivityStat> for StatisticalMeasure {
    fn from(stat: &ActivityStat) -> Self {
        Self::new(stat.code.clone(), stat.count)
    }
}

impl From<Ranked<'_>> for StatisticalMeasure {
    fn from(ranked: Ranked<'_>) -> Self {
        Self {
            rank: Some(ranked.rank),
            ..Self::from(ranked.stat)
        }
    }
}

/// A standalone JSON-LD node carrying its own `@context`.
#[derive(Debug, Clone, Serialize)]
pub struct Document<T> {
    #[serde(rename = "@context")]
    context: Value,
    #[serde(flatten)]
    node: T,
}

impl<T> Document<T> {
    /// Wrap `node` with the shared context.
    pub fn new(node: T) -> Self {
        Self {
            context: context(),
            node,
        }
    }
}

/// Navigation links of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialCollectionView {
    #[serde(rename = "@type")]
    kind: &'static str,
    /// Link to the current page
    #[serde(rename = "@id")]
    pub id: String,
    /// Link to page 1
    pub first: String,
    /// Link to the last page
    pub last: String,
    /// Link to the preceding page, absent on page 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Link to the following page, absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// A Hydra collection document.
#[derive(Debug, Clone, Serialize)]
pub struct Collection<T> {
    #[serde(rename = "@context")]
    context: Value,
    #[serde(rename = "@type")]
    kind: &'static str,
    /// Number of matching items across all pages
    #[serde(rename = "totalItems")]
    pub total_items: usize,
    /// Items of this page
    pub member: Vec<T>,
    /// Paging links; absent for unpaged collections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<PartialCollectionView>,
}

/// Link to `page` of the collection at `base_url`.
pub fn page_link(base_url: &str, page: usize, page_size: usize) -> String {
    format!("{}?page={}&pageSize={}", base_url, page, page_size)
}

/// Navigation links for `params` over `total` items.
pub fn view(total: usize, params: PageParams, base_url: &str) -> PartialCollectionView {
    let PageParams { page, page_size } = params;
    let total_pages = params.total_pages(total);
    let link = |n: usize| page_link(base_url, n, page_size);

    PartialCollectionView {
        kind: VIEW_TYPE,
        id: link(page),
        first: link(1),
        last: link(total_pages),
        previous: (page > 1).then(|| link(page - 1)),
        next: (page < total_pages).then(|| link(page + 1)),
    }
}

/// A paged collection of `items` out of `total` matches.
pub fn paginated<T>(
    items: Vec<T>,
    total: usize,
    params: PageParams,
    base_url: &str,
) -> Collection<T> {
    Collection {
        context: context(),
        kind: COLLECTION_TYPE,
        total_items: total,
        member: items,
        view: Some(view(total, params, base_url)),
    }
}

/// An unpaged collection whose total is its own length.
pub fn unpaged<T>(items: Vec<T>) -> Collection<T> {
    Collection {
        context: context(),
        kind: COLLECTION_TYPE,
        total_items: items.len(),
        member: items,
        view: None,
    }
}

/// Response serialized as `application/ld+json`.
#[derive(Debug, Clone)]
pub struct JsonLd<T>(pub T);

impl<T: Serialize> IntoResponse for JsonLd<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(JSON_LD_CONTENT_TYPE),
                )],
                body,
            )
                .into_response(),
            Err(e) => Error::Internal(format!("Failed to serialize response: {}", e))
                .into_response(),
        }
    }
}
