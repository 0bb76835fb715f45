use std::collections::BTreeMap;

use crate::model::{AggregatedRecord, CompositeKey, ReconciledRecord};
use crate::normalize::saturate;

/// Outer-join planned and actual aggregates on the composite key.
///
/// Every key from either side appears exactly once; the missing side is 0.
/// Output is sorted by key.
pub fn reconcile_aggregates(planned: &[AggregatedRecord], actual: &[AggregatedRecord]) -> Vec<ReconciledRecord> {
    let mut joined: BTreeMap<&CompositeKey, (f64, f64)> = BTreeMap::new();

    for agg in planned {
        let entry = joined.entry(&agg.key).or_insert((0.0, 0.0));
        entry.0 = saturate(entry.0 + agg.sum);
    }
    for agg in actual {
        let entry = joined.entry(&agg.key).or_insert((0.0, 0.0));
        entry.1 = saturate(entry.1 + agg.sum);
    }

    joined
        .into_iter()
        .map(|(key, (planned, actual))| ReconciledRecord::from_parts(key.clone(), planned, actual))
        .collect()
}
