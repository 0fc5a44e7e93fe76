// Per-bucket mean and count computation.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::db::EventRecord;
use crate::splits::MetricKind;

/// One bucket of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: String,
    /// Mean of the non-null metric values. `None` when `count == 0`.
    pub mean: Option<f64>,
    /// Number of records in the bucket with a non-null metric value.
    pub count: usize,
    /// Records in the bucket whose `events` column is non-empty.
    pub plate_appearances: usize,
    /// All records assigned to the bucket, null metric or not.
    pub records: usize,
}

impl AggregateRow {
    pub fn is_empty_bucket(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    records: usize,
    count: usize,
    sum: f64,
    plate_appearances: usize,
}

impl Accumulator {
    fn push(&mut self, record: &EventRecord, metric: MetricKind) {
        self.records += 1;
        if let Some(value) = record.metric(metric) {
            self.count += 1;
            self.sum += value;
        }
        if record.is_plate_appearance() {
            self.plate_appearances += 1;
        }
    }

    fn finish(self, key: String) -> AggregateRow {
        let mean = (self.count > 0).then(|| self.sum / self.count as f64);
        AggregateRow {
            key,
            mean,
            count: self.count,
            plate_appearances: self.plate_appearances,
            records: self.records,
        }
    }
}

/// Group `records` by `key_fn` and aggregate `metric` per group.
///
/// Rows come out in the key type's `Ord` order, which is how each dimension
/// gets its canonical ordering. Groups that never receive a record do not
/// appear.
pub fn aggregate_by<K, F>(records: &[EventRecord], metric: MetricKind, key_fn: F) -> Vec<AggregateRow>
where
    K: Ord + Display,
    F: Fn(&EventRecord) -> K,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for record in records {
        groups.entry(key_fn(record)).or_default().push(record, metric);
    }
    groups
        .into_iter()
        .map(|(key, acc)| acc.finish(key.to_string()))
        .collect()
}

/// Mean of the non-null `metric` values across all records.
pub fn overall_mean(records: &[EventRecord], metric: MetricKind) -> Option<f64> {
    let (sum, n) = records
        .iter()
        .filter_map(|r| r.metric(metric))
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
