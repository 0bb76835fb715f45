use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::HighlightConfig;
use crate::model::{AggregatedRecord, CompositeKey, ReconSummary, ReconciledRecord, Totals};
use crate::normalize::saturate;

/// Direction of a variance once it passes the highlight threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    /// Actual exceeded plan by more than the threshold.
    Overspend,
    /// Actual stayed below plan by more than the threshold.
    Savings,
    Neutral,
}

impl VarianceStatus {
    pub fn classify(variance: f64, threshold: f64) -> Self {
        if variance < -threshold {
            Self::Overspend
        } else if variance > threshold {
            Self::Savings
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for VarianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overspend => write!(f, "overspend"),
            Self::Savings => write!(f, "savings"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

pub fn compute_totals(records: &[ReconciledRecord]) -> Totals {
    let planned = records.iter().fold(0.0, |acc, r| saturate(acc + r.planned));
    let actual = records.iter().fold(0.0, |acc, r| saturate(acc + r.actual));
    Totals {
        planned,
        actual,
        savings: saturate(planned - actual),
    }
}

/// Summary statistics over a reconciled set. Side presence comes from the
/// aggregates, so a zero-sum planned line still counts as planned.
pub fn compute_summary(
    records: &[ReconciledRecord],
    planned: &[AggregatedRecord],
    actual: &[AggregatedRecord],
    highlight: &HighlightConfig,
) -> ReconSummary {
    let planned_keys: BTreeSet<&CompositeKey> = planned.iter().map(|a| &a.key).collect();
    let actual_keys: BTreeSet<&CompositeKey> = actual.iter().map(|a| &a.key).collect();

    let mut summary = ReconSummary {
        total_keys: records.len(),
        matched: planned_keys.intersection(&actual_keys).count(),
        planned_only: planned_keys.difference(&actual_keys).count(),
        actual_only: actual_keys.difference(&planned_keys).count(),
        totals: compute_totals(records),
        ..Default::default()
    };

    for r in records {
        match r.status(highlight) {
            VarianceStatus::Overspend => summary.overspend += 1,
            VarianceStatus::Savings => summary.savings += 1,
            VarianceStatus::Neutral => {}
        }
    }

    summary
}

/// Whole units with a space as thousands separator: `1234567.4` -> `"1 234 567"`.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
