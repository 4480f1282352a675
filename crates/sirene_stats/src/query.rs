//! Sorting, filtering and pagination over an activity snapshot
//!
//! Every function here is pure: it borrows the snapshot records and returns
//! references into them. Sorting is always stable, so records with equal
//! counts keep their snapshot order.
//!
//! Request parameters arrive as raw query-string values and are normalized
//! the same way for every endpoint:
//!
//! | Parameter   | Default | Range      |
//! |-------------|---------|------------|
//! | `page`      | 1       | `>= 1`     |
//! | `pageSize`  | 20      | `1..=100`  |
//! | `limit`     | 10      | `1..=100`  |
//! | `min_count` | 1       | unbounded  |
//!
//! A `min_count` of `0` counts as absent.

use crate::source::ActivityStat;

/// Page size used when none (or a non-numeric one) is given.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: usize = 100;
/// Ranking length used when none is given.
pub const DEFAULT_LIMIT: usize = 10;
/// Longest ranking a client may request.
pub const MAX_LIMIT: usize = 100;
/// Minimum count for the bottom ranking when none is given.
pub const DEFAULT_MIN_COUNT: i64 = 1;
/// Wildcard marker accepted at the end of filter patterns.
pub const WILDCARD: char = '%';

/// Read the leading integer of a raw parameter value.
///
/// Leading whitespace and a single sign are accepted and trailing garbage is
/// ignored, so `"12abc"` reads as 12. Values without leading digits read as
/// `None`. Out-of-range values saturate.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });

    Some(if negative { -value } else { value })
}

fn clamp_to(value: i64, min: usize, max: usize) -> usize {
    value.clamp(min as i64, max as i64) as usize
}

/// Normalized pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based page number
    pub page: usize,
    /// Items per page, within `1..=MAX_PAGE_SIZE`
    pub page_size: usize,
}

impl PageParams {
    /// Build parameters from numeric values, applying the usual bounds.
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1).try_into().unwrap_or(usize::MAX),
            page_size: clamp_to(page_size, 1, MAX_PAGE_SIZE),
        }
    }

    /// Build parameters from raw query-string values.
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self::new(
            page.and_then(parse_leading_int).unwrap_or(1),
            page_size
                .and_then(parse_leading_int)
                .unwrap_or(DEFAULT_PAGE_SIZE as i64),
        )
    }

    /// Index of the first item on the page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total` items; never less than 1.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Normalize a raw `limit` value.
pub fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(parse_leading_int)
        .map(|limit| clamp_to(limit, 1, MAX_LIMIT))
        .unwrap_or(DEFAULT_LIMIT)
}

/// Normalize a raw `min_count` value.
///
/// Zero falls back to the default; negative values are kept.
pub fn parse_min_count(raw: Option<&str>) -> i64 {
    raw.and_then(parse_leading_int)
        .filter(|&min| min != 0)
        .unwrap_or(DEFAULT_MIN_COUNT)
}

/// One page of a sorted result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    /// Items on this page
    pub items: Vec<&'a ActivityStat>,
    /// Number of matching items across all pages
    pub total: usize,
    /// Parameters the page was cut with
    pub params: PageParams,
}

impl Page<'_> {
    /// Number of pages in the full result set.
    pub fn total_pages(&self) -> usize {
        self.params.total_pages(self.total)
    }
}

/// A record with its 1-based position in a ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked<'a> {
    /// Position in the ranking, starting at 1
    pub rank: usize,
    /// The ranked record
    pub stat: &'a ActivityStat,
}

fn sort_descending(items: &mut [&ActivityStat]) {
    items.sort_by(|a, b| b.count.cmp(&a.count));
}

fn sort_ascending(items: &mut [&ActivityStat]) {
    items.sort_by(|a, b| a.count.cmp(&b.count));
}

fn paginate<'a>(sorted: Vec<&'a ActivityStat>, params: PageParams) -> Page<'a> {
    let total = sorted.len();
    let items = sorted
        .into_iter()
        .skip(params.offset())
        .take(params.page_size)
        .collect();

    Page {
        items,
        total,
        params,
    }
}

fn rank(sorted: Vec<&ActivityStat>, limit: usize) -> Vec<Ranked<'_>> {
    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, stat)| Ranked { rank: i + 1, stat })
        .collect()
}

/// All records by descending count, one page at a time.
pub fn list_all(records: &[ActivityStat], params: PageParams) -> Page<'_> {
    let mut sorted: Vec<_> = records.iter().collect();
    sort_descending(&mut sorted);
    paginate(sorted, params)
}

/// Record for `code`, or a zero count when the code is absent.
pub fn get_one(records: &[ActivityStat], code: &str) -> ActivityStat {
    records
        .iter()
        .find(|r| r.code == code)
        .cloned()
        .unwrap_or_else(|| ActivityStat::new(code, 0))
}

/// Strip the wildcard marker from a filter pattern.
pub fn clean_pattern(pattern: &str) -> String {
    pattern.replacen(WILDCARD, "", 1)
}

/// Records whose code starts with `pattern`, by descending count, one page at a time.
pub fn filter_by_prefix<'a>(
    records: &'a [ActivityStat],
    pattern: &str,
    params: PageParams,
) -> Page<'a> {
    let prefix = clean_pattern(pattern);
    let mut sorted: Vec<_> = records
        .iter()
        .filter(|r| r.code.starts_with(prefix.as_str()))
        .collect();
    sort_descending(&mut sorted);
    paginate(sorted, params)
}

/// The `limit` records with the highest counts.
pub fn top(records: &[ActivityStat], limit: usize) -> Vec<Ranked<'_>> {
    let mut sorted: Vec<_> = records.iter().collect();
    sort_descending(&mut sorted);
    rank(sorted, limit)
}

/// The `limit` records with the lowest counts among those with at least `min_count`.
pub fn bottom(records: &[ActivityStat], limit: usize, min_count: i64) -> Vec<Ranked<'_>> {
    let mut sorted: Vec<_> = records
        .iter()
        .filter(|r| u64::try_from(min_count).map_or(true, |min| r.count >= min))
        .collect();
    sort_ascending(&mut sorted);
    rank(sorted, limit)
}
