use crate::aggregate::{aggregate_records, extract_records, AggregateOptions};
use crate::columns::require_column;
use crate::config::{KeyColumns, ReconConfig, SideConfig};
use crate::error::{ReconError, Side};
use crate::model::{AggregatedRecord, ReconInput, ReconMeta, ReconResult, ReconciledRecord, Table};
use crate::reconcile::reconcile_aggregates;
use crate::source::DataProvider;
use crate::summary::compute_summary;

/// Reconcile planned vs actual tables with the default key columns.
///
/// Blank-manager rows are skipped on the actual side only.
pub fn reconcile<S: AsRef<str>>(
    planned: &Table,
    actual: &Table,
    planned_candidates: &[S],
    actual_candidates: &[S],
) -> Result<Vec<ReconciledRecord>, ReconError> {
    let keys = KeyColumns::default();
    let (planned_aggs, _) = prepare_side(Side::Planned, planned, &keys, planned_candidates, &AggregateOptions::default())?;
    let actual_options = AggregateOptions {
        skip_blank_manager: true,
        ..Default::default()
    };
    let (actual_aggs, _) = prepare_side(Side::Actual, actual, &keys, actual_candidates, &actual_options)?;
    Ok(reconcile_aggregates(&planned_aggs, &actual_aggs))
}

/// Run reconciliation per config. Returns reconciled rows + summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    let (planned_aggs, planned_column) = prepare_configured(Side::Planned, &input.planned, config, &config.planned)?;
    let (actual_aggs, actual_column) = prepare_configured(Side::Actual, &input.actual, config, &config.actual)?;

    let records = reconcile_aggregates(&planned_aggs, &actual_aggs);
    let summary = compute_summary(&records, &planned_aggs, &actual_aggs, &config.highlight);

    tracing::info!(
        keys = summary.total_keys,
        planned_only = summary.planned_only,
        actual_only = summary.actual_only,
        "reconciled"
    );

    Ok(ReconResult {
        meta: ReconMeta {
            report_name: config.name.clone(),
            planned_column,
            actual_column,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        records,
    })
}

/// Fetch both tabs named in the config from a provider.
pub fn load_input(provider: &dyn DataProvider, config: &ReconConfig) -> Result<ReconInput, ReconError> {
    let sheet = &config.source.sheet;
    Ok(ReconInput {
        planned: provider.fetch_table(sheet, &config.planned.tab)?,
        actual: provider.fetch_table(sheet, &config.actual.tab)?,
    })
}

fn prepare_configured(
    side: Side,
    table: &Table,
    config: &ReconConfig,
    side_config: &SideConfig,
) -> Result<(Vec<AggregatedRecord>, String), ReconError> {
    prepare_side(
        side,
        table,
        &config.columns,
        side_config.amount_candidates.as_slice(),
        &side_config.aggregate_options(),
    )
}

/// Resolve the amount column, normalize and aggregate one side.
fn prepare_side<S: AsRef<str>>(
    side: Side,
    table: &Table,
    keys: &KeyColumns,
    candidates: &[S],
    options: &AggregateOptions,
) -> Result<(Vec<AggregatedRecord>, String), ReconError> {
    let column = require_column(side, &table.columns, candidates)?;
    let records = extract_records(side, table, keys, &column)?;
    let aggregates = aggregate_records(&records, options);
    tracing::debug!(%side, rows = records.len(), groups = aggregates.len(), "aggregated");
    Ok((aggregates, column))
}
