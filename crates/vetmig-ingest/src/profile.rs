//! Per-column statistics used by the diagnostic analyzer.

use std::collections::{BTreeMap, BTreeSet};

use crate::sheet::SheetTable;

/// Statistical hints for one column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColumnHint {
    /// Every non-empty value parses as a number.
    pub is_numeric: bool,
    pub null_ratio: f64,
    pub unique_ratio: f64,
    pub non_null: usize,
}

/// Builds column hints for a sheet.
pub fn build_column_hints(table: &SheetTable) -> BTreeMap<String, ColumnHint> {
    let mut hints = BTreeMap::new();
    let row_count = table.rows.len();
    for (col_idx, header) in table.headers.iter().enumerate() {
        let mut non_null = 0usize;
        let mut numeric = 0usize;
        let mut uniques = BTreeSet::new();
        for row in &table.rows {
            let value = row.get(col_idx).map(String::as_str).unwrap_or("");
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            non_null += 1;
            uniques.insert(trimmed.to_string());
            if trimmed.parse::<f64>().is_ok() {
                numeric += 1;
            }
        }
        let null_ratio = if row_count == 0 {
            1.0
        } else {
            (row_count.saturating_sub(non_null)) as f64 / row_count as f64
        };
        let unique_ratio = if non_null == 0 {
            0.0
        } else {
            uniques.len() as f64 / non_null as f64
        };
        let is_numeric = non_null > 0 && numeric == non_null;
        hints.insert(
            header.clone(),
            ColumnHint {
                is_numeric,
                null_ratio,
                unique_ratio,
                non_null,
            },
        );
    }
    hints
}
