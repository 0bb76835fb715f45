//! Data providers: where worksheet tabs come from.

use std::path::{Path, PathBuf};

use crate::error::ReconError;
use crate::model::{Cell, Table};

/// Fetches one worksheet tab. Failures are [`ReconError::DataSource`] and
/// are passed through to the caller without retrying.
pub trait DataProvider {
    fn fetch_table(&self, sheet: &str, tab: &str) -> Result<Table, ReconError>;
}

/// Reads a spreadsheet exported as one CSV file per tab:
/// sheet `S`, tab `T` is `<root>/S/T.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    root: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn tab_path(&self, sheet: &str, tab: &str) -> PathBuf {
        self.root.join(sheet).join(format!("{tab}.csv"))
    }
}

impl DataProvider for CsvDirectoryProvider {
    fn fetch_table(&self, sheet: &str, tab: &str) -> Result<Table, ReconError> {
        let path = self.tab_path(sheet, tab);
        let data = std::fs::read_to_string(&path).map_err(|e| ReconError::DataSource {
            sheet: sheet.into(),
            tab: tab.into(),
            message: format!("{}: {e}", display(&path)),
        })?;
        let table = parse_csv_table(&data).map_err(|message| ReconError::DataSource {
            sheet: sheet.into(),
            tab: tab.into(),
            message,
        })?;
        tracing::info!(sheet, tab, rows = table.rows.len(), "loaded tab");
        Ok(table)
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Parse CSV text with a header row. Blank cells become [`Cell::Empty`],
/// everything else stays text for the normalizer to interpret.
pub fn parse_csv_table(csv_data: &str) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.trim_start_matches('\u{feff}').as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(
            record
                .iter()
                .map(|v| if v.is_empty() { Cell::Empty } else { Cell::Text(v.to_string()) })
                .collect(),
        );
    }

    Ok(Table::new(columns, rows))
}
