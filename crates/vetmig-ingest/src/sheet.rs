//! Sheet reading with header and cell normalization.

use std::path::Path;

use csv::ReaderBuilder;

use vetmig_model::Record;

use crate::error::{IngestError, Result};

/// Headers plus string rows read from one sheet.
///
/// Rows are padded or truncated to the header width; fully empty rows are
/// skipped on read.
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
    /// Sheet name (file stem of the source CSV).
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Column index for a header, matched case-insensitively.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(column))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Materializes one row as a column → value record.
    pub fn record(&self, row_index: usize) -> Option<Record> {
        let row = self.rows.get(row_index)?;
        let mut record = Record::new(row_index);
        for (header, value) in self.headers.iter().zip(row.iter()) {
            record.set(header.clone(), value.clone());
        }
        Some(record)
    }

    /// Iterates all rows as records.
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        (0..self.rows.len()).filter_map(|index| self.record(index))
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reads a sheet CSV file into a [`SheetTable`].
///
/// The first non-empty row is the header; later rows are normalized to the
/// header width.
pub fn read_sheet(path: &Path, name: &str) -> Result<SheetTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::SheetParse {
            path: path.to_path_buf(),
            source,
        })?;
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::SheetParse {
            path: path.to_path_buf(),
            source,
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    if raw_rows.is_empty() {
        return Ok(SheetTable {
            name: name.to_string(),
            headers: Vec::new(),
            rows: Vec::new(),
        });
    }
    let headers: Vec<String> = raw_rows[0].iter().map(|value| normalize_header(value)).collect();
    let mut rows = Vec::with_capacity(raw_rows.len().saturating_sub(1));
    for record in raw_rows.iter().skip(1) {
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            let value = record.get(idx).map(String::as_str).unwrap_or("");
            row.push(value.to_string());
        }
        rows.push(row);
    }
    Ok(SheetTable {
        name: name.to_string(),
        headers,
        rows,
    })
}
