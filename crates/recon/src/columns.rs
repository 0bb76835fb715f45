use crate::error::{ReconError, Side};

/// Find the first column whose lowercased, trimmed name contains any of the
/// candidates (case-insensitive). Column order wins over candidate order.
///
/// Returns the trimmed column name, or `None` when nothing matches.
pub fn resolve_column<S: AsRef<str>>(columns: &[String], candidates: &[S]) -> Option<String> {
    resolve_column_index(columns, candidates).map(|i| columns[i].trim().to_string())
}

/// Position of the column [`resolve_column`] would pick.
pub fn resolve_column_index<S: AsRef<str>>(columns: &[String], candidates: &[S]) -> Option<usize> {
    let needles: Vec<String> = candidates
        .iter()
        .map(|c| c.as_ref().trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    columns.iter().position(|column| {
        let haystack = column.trim().to_lowercase();
        needles.iter().any(|needle| haystack.contains(needle.as_str()))
    })
}

/// Like [`resolve_column`], but a miss is a [`ReconError::ColumnNotFound`].
pub fn require_column<S: AsRef<str>>(
    side: Side,
    columns: &[String],
    candidates: &[S],
) -> Result<String, ReconError> {
    let found = resolve_column(columns, candidates).ok_or_else(|| ReconError::ColumnNotFound {
        side,
        candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
    })?;
    tracing::debug!(%side, column = %found, "resolved amount column");
    Ok(found)
}
