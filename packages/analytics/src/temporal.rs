//! Year-month bucketing.
//!
//! Records are grouped by [`MonthKey`]. The bucket order is chronological
//! for `YYYY-MM` keys, then any non-conforming keys in the order they were
//! first seen, then `"Unknown"`. The index is rebuilt wholesale for every
//! loaded record set and never mutated afterwards.

use std::collections::HashMap;

use shelter_map_analytics_models::BucketView;
use shelter_map_source_models::{MonthKey, ResolvedRecord};

use crate::arena::dedupe;

#[derive(Debug, Clone, Default)]
pub struct TemporalIndex {
    buckets: HashMap<MonthKey, Vec<ResolvedRecord>>,
    sorted_keys: Vec<MonthKey>,
}

impl TemporalIndex {
    /// Buckets `records` by their month key.
    #[must_use]
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ResolvedRecord>,
    {
        let mut buckets: HashMap<MonthKey, Vec<ResolvedRecord>> = HashMap::new();
        let mut first_seen = Vec::new();

        for record in records {
            let bucket = buckets.entry(record.month_key.clone()).or_insert_with(|| {
                first_seen.push(record.month_key.clone());
                Vec::new()
            });
            bucket.push(record);
        }

        let sorted_keys = sort_month_keys(first_seen);
        log::debug!(
            "Bucketed records into {} months ({} unknown)",
            sorted_keys.len(),
            buckets.get(&MonthKey::unknown()).map_or(0, Vec::len),
        );

        Self {
            buckets,
            sorted_keys,
        }
    }

    /// Bucket keys in display order.
    #[must_use]
    pub fn sorted_keys(&self) -> &[MonthKey] {
        &self.sorted_keys
    }

    /// Records of one bucket, in input order. Empty for unknown keys.
    #[must_use]
    pub fn bucket(&self, key: &MonthKey) -> &[ResolvedRecord] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// The bucket at `index` in display order.
    #[must_use]
    pub fn bucket_at(&self, index: usize) -> Option<(&MonthKey, &[ResolvedRecord])> {
        let key = self.sorted_keys.get(index)?;
        Some((key, self.bucket(key)))
    }

    /// Deduplicated single-bucket view at `index`.
    #[must_use]
    pub fn view_at(&self, index: usize) -> Option<BucketView> {
        let (key, records) = self.bucket_at(index)?;
        Some(BucketView::new(index, key.clone(), dedupe(records.iter().cloned())))
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted_keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted_keys.is_empty()
    }

    /// Records across all buckets, duplicates included.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Orders month keys for display.
///
/// Conforming `YYYY-MM` keys sort ascending; non-conforming keys follow in
/// their input order; `"Unknown"` is always last. Duplicates are removed.
#[must_use]
pub fn sort_month_keys(keys: Vec<MonthKey>) -> Vec<MonthKey> {
    let mut conforming = Vec::new();
    let mut other = Vec::new();
    let mut has_unknown = false;

    for key in keys {
        if key.is_unknown() {
            has_unknown = true;
        } else if key.is_conforming() {
            conforming.push(key);
        } else {
            other.push(key);
        }
    }

    conforming.sort_unstable();
    conforming.dedup();
    let mut seen = std::collections::HashSet::new();
    other.retain(|key| seen.insert(key.clone()));

    conforming.extend(other);
    if has_unknown {
        conforming.push(MonthKey::unknown());
    }
    conforming
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use shelter_map_source_models::RawRecord;

    use super::*;
    use crate::resolve::RecordResolver;

    fn dated(name: &str, date: Value) -> ResolvedRecord {
        let raw: RawRecord = serde_json::from_value(json!({
            "geometry": null,
            "properties": {"name": name, "date": date, "species": "cat"}
        }))
        .unwrap();
        RecordResolver::default().resolve(raw)
    }

    fn keys(index: &TemporalIndex) -> Vec<&str> {
        index.sorted_keys().iter().map(MonthKey::as_str).collect()
    }

    #[test]
    fn malformed_dates_share_the_unknown_bucket() {
        let index = TemporalIndex::build(vec![
            dated("a", json!("2023-05-01")),
            dated("b", json!("2023-01-10")),
            dated("c", Value::Null),
            dated("d", json!("garbage")),
        ]);

        assert_eq!(keys(&index), ["2023-01", "2023-05", "Unknown"]);
        assert_eq!(index.bucket(&MonthKey::unknown()).len(), 2);
        assert_eq!(index.record_count(), 4);
    }

    #[test]
    fn bucket_contents_keep_input_order() {
        let index = TemporalIndex::build(vec![
            dated("first", json!("2022-12-31")),
            dated("other", json!("2023-02-01")),
            dated("second", json!("2022-12-01")),
        ]);
        let (key, records) = index.bucket_at(0).unwrap();
        assert_eq!(key.as_str(), "2022-12");
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn non_conforming_keys_precede_unknown() {
        let sorted = sort_month_keys(vec![
            MonthKey::unknown(),
            MonthKey::new("Q3"),
            MonthKey::new("2024-02"),
            MonthKey::new("10000-01"),
            MonthKey::new("2023-11"),
            MonthKey::new("Q3"),
        ]);
        let sorted: Vec<&str> = sorted.iter().map(MonthKey::as_str).collect();
        assert_eq!(sorted, ["2023-11", "2024-02", "Q3", "10000-01", "Unknown"]);
    }

    #[test]
    fn view_at_dedupes_within_the_bucket() {
        let index = TemporalIndex::build(vec![
            dated("Rex", json!("2023-05-01")),
            dated("Rex", json!("2023-05-01")),
            dated("Max", json!("2023-05-01")),
        ]);
        let view = index.view_at(0).unwrap();
        assert_eq!(view.records.len(), 2);
        assert_eq!(view.label, "Maggio 2023");
        assert_eq!(view.species.total(), 2);
        assert!(index.view_at(1).is_none());
    }

    #[test]
    fn empty_input_has_no_buckets() {
        let index = TemporalIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.bucket_at(0).is_none());
    }
}
