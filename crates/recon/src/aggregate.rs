use std::collections::BTreeMap;

use crate::config::KeyColumns;
use crate::error::{ReconError, Side};
use crate::model::{AggregatedRecord, CompositeKey, ExpenseRecord, Table};
use crate::normalize::{normalize_amount, saturate};

/// Row pre-filter applied before grouping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateOptions {
    /// Drop rows whose manager is empty after trimming.
    pub skip_blank_manager: bool,
    /// Drop rows whose manager equals one of these (e.g. a grand-total row).
    pub exclude_managers: Vec<String>,
}

impl AggregateOptions {
    fn keeps(&self, record: &ExpenseRecord) -> bool {
        let manager = &record.key.manager;
        if self.skip_blank_manager && manager.trim().is_empty() {
            return false;
        }
        !self.exclude_managers.iter().any(|m| m == manager)
    }
}

/// Read key columns and the (already resolved) value column from a table,
/// normalizing every amount.
pub fn extract_records(
    side: Side,
    table: &Table,
    keys: &KeyColumns,
    value_column: &str,
) -> Result<Vec<ExpenseRecord>, ReconError> {
    let idx = |name: &str| {
        table.column_index(name).ok_or_else(|| ReconError::ColumnNotFound {
            side,
            candidates: vec![name.to_string()],
        })
    };

    let manager_idx = idx(&keys.manager)?;
    let project_idx = idx(&keys.project)?;
    let category_idx = idx(&keys.category)?;
    let value_idx = idx(value_column)?;

    Ok(table
        .rows
        .iter()
        .map(|row| ExpenseRecord {
            key: CompositeKey {
                manager: Table::cell(row, manager_idx).as_key_text(),
                project: Table::cell(row, project_idx).as_key_text(),
                category: Table::cell(row, category_idx).as_key_text(),
            },
            amount: normalize_amount(Table::cell(row, value_idx)),
        })
        .collect())
}

/// Group records by composite key and sum amounts. Output is sorted by key.
pub fn aggregate_records(records: &[ExpenseRecord], options: &AggregateOptions) -> Vec<AggregatedRecord> {
    let mut groups: BTreeMap<&CompositeKey, (f64, usize)> = BTreeMap::new();
    let mut skipped = 0usize;
    let mut overflowed = 0usize;

    for record in records {
        if !options.keeps(record) {
            skipped += 1;
            continue;
        }
        let entry = groups.entry(&record.key).or_insert((0.0, 0));
        let sum = entry.0 + record.amount;
        if !sum.is_finite() {
            overflowed += 1;
        }
        entry.0 = saturate(sum);
        entry.1 += 1;
    }

    if overflowed > 0 {
        tracing::warn!(overflowed, "group sums exceeded the f64 range and were clamped");
    }

    if skipped > 0 {
        tracing::debug!(skipped, "rows dropped by pre-filter");
    }

    groups
        .into_iter()
        .map(|(key, (sum, record_count))| AggregatedRecord {
            key: key.clone(),
            sum,
            record_count,
        })
        .collect()
}
