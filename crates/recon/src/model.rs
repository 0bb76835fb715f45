use serde::{Deserialize, Serialize};

use crate::config::HighlightConfig;
use crate::normalize::saturate;
use crate::summary::VarianceStatus;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single spreadsheet cell as delivered by the data provider.
///
/// Untagged so that JSON rows (`null`, `true`, `1500`, `"1 500,00"`) map
/// directly onto the variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Text view of the cell used for key columns. Integral numbers print
    /// without a trailing `.0`.
    pub fn as_key_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One worksheet tab: header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Position of a column, comparing trimmed header names.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.columns.iter().position(|c| c.trim() == wanted)
    }

    /// Cell at (row, col); short rows read as empty.
    pub fn cell(row: &[Cell], col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        row.get(col).unwrap_or(&EMPTY)
    }
}

/// Planned and actual tables handed to the engine, already fetched.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub planned: Table,
    pub actual: Table,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// (manager, project, expense category). Ordering drives output order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CompositeKey {
    pub manager: String,
    pub project: String,
    pub category: String,
}

impl CompositeKey {
    pub fn new(manager: impl Into<String>, project: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            manager: manager.into(),
            project: project.into(),
            category: category.into(),
        }
    }
}

/// A source row reduced to its key and normalized amount.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub key: CompositeKey,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRecord {
    #[serde(flatten)]
    pub key: CompositeKey,
    pub sum: f64,
    pub record_count: usize,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRecord {
    pub manager: String,
    pub project: String,
    pub category: String,
    pub planned: f64,
    pub actual: f64,
    /// planned - actual. Positive is savings, negative is overspend.
    pub variance: f64,
}

impl ReconciledRecord {
    pub fn from_parts(key: CompositeKey, planned: f64, actual: f64) -> Self {
        Self {
            manager: key.manager,
            project: key.project,
            category: key.category,
            planned,
            actual,
            variance: saturate(planned - actual),
        }
    }

    pub fn key(&self) -> CompositeKey {
        CompositeKey::new(self.manager.clone(), self.project.clone(), self.category.clone())
    }

    pub fn status(&self, highlight: &HighlightConfig) -> VarianceStatus {
        VarianceStatus::classify(self.variance, highlight.threshold)
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub planned: f64,
    pub actual: f64,
    /// planned - actual across the visible rows.
    pub savings: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub total_keys: usize,
    pub matched: usize,
    pub planned_only: usize,
    pub actual_only: usize,
    pub overspend: usize,
    pub savings: usize,
    pub totals: Totals,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub report_name: String,
    pub planned_column: String,
    pub actual_column: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub records: Vec<ReconciledRecord>,
}
