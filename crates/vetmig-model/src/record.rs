//! Record shapes for the merge → organize → extract → transform stages.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed delimiter between the parts of a unified `NOTAS` field.
pub const NOTAS_DELIMITER: &str = " // ";

/// One row of a source sheet as a column → value map.
///
/// Column sets vary per source system and module, so rows stay dynamic and
/// the module mapping names which columns matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Zero-based data row index in the source sheet, for diagnostics.
    pub row_index: usize,
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(row_index: usize) -> Self {
        Self {
            row_index,
            fields: BTreeMap::new(),
        }
    }

    /// Returns the trimmed value of a column, or `None` when absent or
    /// empty. Lookup prefers an exact key and falls back to a
    /// case-insensitive match, mirroring header matching at ingest.
    pub fn get(&self, column: &str) -> Option<&str> {
        let value = self.fields.get(column).or_else(|| {
            self.fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(column))
                .map(|(_, value)| value)
        })?;
        let trimmed = value.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }
}

/// Outcome of the catalog join for one primary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Matched,
    Unmatched,
}

/// A primary record with catalog fields attached where the join succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecord {
    pub record: Record,
    pub status: MatchStatus,
    /// Name of the catalog sheet that supplied the match, when matched.
    pub catalog: Option<String>,
}

impl MergedRecord {
    pub fn is_matched(&self) -> bool {
        self.status == MatchStatus::Matched
    }
}

/// Validation bucket assigned by the organizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bucket {
    /// Passed validation; eligible for transformation.
    Clean,
    /// Matched but failed a validation rule; surfaced in the error report.
    Excluded,
    /// The catalog join found no entry for the record's key.
    NoMatch,
}

/// A merged record routed to its bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizedRecord {
    pub merged: MergedRecord,
    pub bucket: Bucket,
    /// Populated for `Bucket::Excluded` with the failing rule.
    pub exclusion_reason: Option<String>,
}

/// Vital signs mined from a free-text note field.
///
/// Values are normalized to canonical units; a missing field means no
/// pattern matched, which is not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedVitals {
    /// Weight in kilograms.
    pub weight_kg: Option<f64>,
    /// Body temperature in degrees Celsius.
    pub temperature_c: Option<f64>,
    /// Heart rate in beats per minute.
    pub heart_rate_bpm: Option<u32>,
    /// Respiratory rate in breaths per minute.
    pub respiratory_rate_rpm: Option<u32>,
}

impl ExtractedVitals {
    pub fn is_empty(&self) -> bool {
        self.weight_kg.is_none()
            && self.temperature_c.is_none()
            && self.heart_rate_bpm.is_none()
            && self.respiratory_rate_rpm.is_none()
    }
}

/// Terminal record shape written to the import file.
///
/// Invariant: `id_atencion` and `id_mascota` are non-empty and `fecha` is a
/// valid calendar date; the transformer excludes anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    pub id_atencion: String,
    pub id_mascota: String,
    pub fecha: NaiveDate,
    pub notas: String,
}

/// Joins notas parts in fixed order, skipping empty parts.
pub fn compose_notas<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let filled: Vec<&str> = parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    filled.join(NOTAS_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_get_trims_and_drops_empty() {
        let mut record = Record::new(0);
        record.set("Name", "  Vacuna Triple  ");
        record.set("Note", "   ");
        assert_eq!(record.get("Name"), Some("Vacuna Triple"));
        assert_eq!(record.get("Note"), None);
        assert_eq!(record.get("Missing"), None);
    }

    #[test]
    fn compose_notas_fixed_order_and_delimiter() {
        let notas = compose_notas([
            "Vacuna Triple",
            "Aplicada correctamente",
            "Primera dosis",
        ]);
        assert_eq!(
            notas,
            "Vacuna Triple // Aplicada correctamente // Primera dosis"
        );
    }

    #[test]
    fn compose_notas_skips_empty_parts() {
        assert_eq!(compose_notas(["Control", "", "  "]), "Control");
        assert_eq!(compose_notas(["", "peso estable", ""]), "peso estable");
    }
}
