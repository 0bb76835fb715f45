use crate::model::Cell;

/// Convert a spreadsheet cell into a finite amount.
///
/// Lenient by policy: anything that cannot be read as a number is `0.0`.
/// Text has plain and non-breaking spaces removed and a decimal comma turned
/// into a period before parsing, so `"1 234,56"` reads as `1234.56`.
pub fn normalize_amount(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Text(text) => normalize_text(text),
        Cell::Number(_) | Cell::Empty | Cell::Bool(_) => 0.0,
    }
}

fn normalize_text(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ' ' && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "-" {
        return 0.0;
    }

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            tracing::debug!(value = text, "unparseable amount, counting as 0");
            0.0
        }
    }
}

/// Clamp an overflowed sum back into the finite range.
pub(crate) fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX)
    }
}
