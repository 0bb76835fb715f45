//! Revenue and margin plans per manager, read from the general-parameters tab.

use serde::Serialize;

use crate::columns::resolve_column_index;
use crate::config::{KeyColumns, KpiConfig};
use crate::error::{ReconError, Side};
use crate::model::Table;
use crate::normalize::normalize_amount;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerPlan {
    pub manager: String,
    pub revenue_plan: f64,
    pub margin_plan: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub revenue_column: String,
    pub margin_column: String,
    pub total_revenue_plan: f64,
    pub total_margin_plan: f64,
    /// One entry per source row, in source order.
    pub managers: Vec<ManagerPlan>,
}

/// Collect per-manager plans, dropping grand-total rows listed in
/// `exclude_managers`.
pub fn summarize_plans(table: &Table, keys: &KeyColumns, config: &KpiConfig) -> Result<KpiSummary, ReconError> {
    let manager_idx = table.column_index(&keys.manager).ok_or_else(|| ReconError::ColumnNotFound {
        side: Side::Kpi,
        candidates: vec![keys.manager.clone()],
    })?;

    let revenue_idx = require_index(table, &config.revenue_candidates)?;
    let margin_idx = require_index(table, &config.margin_candidates)?;

    let managers: Vec<ManagerPlan> = table
        .rows
        .iter()
        .filter_map(|row| {
            let manager = Table::cell(row, manager_idx).as_key_text();
            if config.exclude_managers.iter().any(|m| *m == manager) {
                return None;
            }
            Some(ManagerPlan {
                manager,
                revenue_plan: normalize_amount(Table::cell(row, revenue_idx)),
                margin_plan: normalize_amount(Table::cell(row, margin_idx)),
            })
        })
        .collect();

    Ok(KpiSummary {
        total_revenue_plan: managers.iter().map(|m| m.revenue_plan).sum(),
        total_margin_plan: managers.iter().map(|m| m.margin_plan).sum(),
        revenue_column: table.columns[revenue_idx].trim().to_string(),
        margin_column: table.columns[margin_idx].trim().to_string(),
        managers,
    })
}

fn require_index(table: &Table, candidates: &[String]) -> Result<usize, ReconError> {
    resolve_column_index(&table.columns, candidates).ok_or_else(|| ReconError::ColumnNotFound {
        side: Side::Kpi,
        candidates: candidates.to_vec(),
    })
}
