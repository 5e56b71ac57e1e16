//! Diagnostic sheet profiling.
//!
//! The analyzer is read-only: it classifies columns so an operator can
//! sanity-check a new client's export (and spot a mapping that points at
//! the wrong column) before running the destructive stages.

use tracing::debug;
use vetmig_ingest::{SheetTable, build_column_hints};

use crate::dates::parse_date;

/// Share of non-empty values that must parse as dates before a column
/// is called date-like.
const DATE_LIKE_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    DateLike,
    Text,
}

impl ColumnKind {
    pub fn label(self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::DateLike => "date",
            ColumnKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub null_ratio: f64,
    pub unique_ratio: f64,
}

/// Profile of one sheet, columns in header order.
#[derive(Debug, Clone)]
pub struct SheetProfile {
    pub sheet: String,
    pub row_count: usize,
    pub columns: Vec<ColumnProfile>,
}

/// Profiles a sheet's columns.
pub fn analyze_sheet(table: &SheetTable) -> SheetProfile {
    let hints = build_column_hints(table);
    let mut columns = Vec::with_capacity(table.headers.len());
    for (col_idx, header) in table.headers.iter().enumerate() {
        let hint = hints.get(header).copied().unwrap_or_default();
        let kind = if hint.is_numeric {
            ColumnKind::Numeric
        } else if date_like_ratio(table, col_idx) >= DATE_LIKE_THRESHOLD {
            ColumnKind::DateLike
        } else {
            ColumnKind::Text
        };
        columns.push(ColumnProfile {
            name: header.clone(),
            kind,
            null_ratio: hint.null_ratio,
            unique_ratio: hint.unique_ratio,
        });
    }
    let profile = SheetProfile {
        sheet: table.name.clone(),
        row_count: table.rows.len(),
        columns,
    };
    debug!(
        sheet = %profile.sheet,
        rows = profile.row_count,
        columns = profile.columns.len(),
        "sheet profiled"
    );
    profile
}

fn date_like_ratio(table: &SheetTable, col_idx: usize) -> f64 {
    let mut non_empty = 0usize;
    let mut dates = 0usize;
    for row in &table.rows {
        let value = row.get(col_idx).map(String::as_str).unwrap_or("").trim();
        if value.is_empty() {
            continue;
        }
        non_empty += 1;
        if parse_date(value).is_some() {
            dates += 1;
        }
    }
    if non_empty == 0 {
        0.0
    } else {
        dates as f64 / non_empty as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> SheetTable {
        SheetTable {
            name: "pacientevacuna".to_string(),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| (*v).to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn classifies_numeric_date_and_text_columns() {
        let table = table(
            &["PatientId", "DataDate", "Note"],
            &[
                &["1", "2023-01-15", "Peso: 4.5 kg"],
                &["2", "2023-02-01", "control"],
                &["3", "15/03/2023", ""],
            ],
        );
        let profile = analyze_sheet(&table);
        assert_eq!(profile.row_count, 3);
        let kinds: Vec<ColumnKind> = profile.columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ColumnKind::Numeric, ColumnKind::DateLike, ColumnKind::Text]
        );
    }

    #[test]
    fn mostly_dates_with_stray_garbage_is_still_date_like() {
        let table = table(
            &["DataDate"],
            &[
                &["2023-01-01"],
                &["2023-01-02"],
                &["2023-01-03"],
                &["2023-01-04"],
                &["pendiente"],
            ],
        );
        let profile = analyze_sheet(&table);
        assert_eq!(profile.columns[0].kind, ColumnKind::DateLike);
    }

    #[test]
    fn empty_column_is_text() {
        let table = table(&["Unused"], &[&[""], &[""]]);
        let profile = analyze_sheet(&table);
        assert_eq!(profile.columns[0].kind, ColumnKind::Text);
        assert!((profile.columns[0].null_ratio - 1.0).abs() < 1e-9);
    }
}
