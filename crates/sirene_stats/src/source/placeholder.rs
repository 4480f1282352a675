//! Deterministic development dataset

use async_trait::async_trait;

use super::{ActivitySource, ActivityStat};
use crate::error::Result;

/// Default records, already in descending count order.
const DEFAULT_RECORDS: &[(&str, u64)] = &[
    ("6201Z", 45230),
    ("4711D", 38920),
    ("5610A", 35800),
    ("6820A", 32100),
    ("4399C", 28500),
    ("8559A", 25400),
    ("6202A", 24300),
    ("7022Z", 22100),
    ("4321A", 21000),
    ("4520A", 19800),
    ("9609Z", 18500),
    ("8690A", 17200),
    ("4778C", 16800),
    ("5520Z", 15300),
    ("4941A", 14700),
    ("6311Z", 13900),
    ("7112B", 12500),
    ("6910Z", 11800),
    ("8621Z", 10200),
    ("4332A", 9800),
];

/// Source that always returns the same in-memory records.
#[derive(Debug, Clone)]
pub struct PlaceholderSource {
    records: Vec<ActivityStat>,
}

impl PlaceholderSource {
    /// Placeholder source serving the built-in development dataset.
    pub fn new() -> Self {
        Self::with_records(
            DEFAULT_RECORDS
                .iter()
                .map(|(code, count)| ActivityStat::new(*code, *count))
                .collect(),
        )
    }

    /// Placeholder source serving the given records.
    pub fn with_records(records: Vec<ActivityStat>) -> Self {
        Self { records }
    }

    /// The records this source returns.
    pub fn records(&self) -> &[ActivityStat] {
        &self.records
    }
}

impl Default for PlaceholderSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivitySource for PlaceholderSource {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    async fn fetch(&self) -> Result<Vec<ActivityStat>> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_default_dataset() {
        let records = PlaceholderSource::new().fetch().await.unwrap();
        assert_eq!(records.len(), 20);
        assert_eq!(records[0], ActivityStat::new("6201Z", 45230));
        assert_eq!(records[19], ActivityStat::new("4332A", 9800));
    }

    #[test]
    fn test_default_codes_are_unique() {
        let source = PlaceholderSource::new();
        let codes: HashSet<_> = source.records().iter().map(|r| &r.code).collect();
        assert_eq!(codes.len(), source.records().len());
    }
}
