//! Routes merged records into the clean, excluded, and no-match buckets.
//!
//! Validation rules run in a fixed order and the first failing rule
//! names the exclusion reason. Every input record lands in exactly one
//! bucket; nothing is dropped before reporting.

use tracing::debug;
use vetmig_ingest::SheetTable;
use vetmig_model::{
    Bucket, MergedRecord, MigrationError, ModuleMapping, OrganizedRecord, Result,
};

use crate::dates::parse_date;

/// Merged records partitioned by bucket.
#[derive(Debug, Clone, Default)]
pub struct OrganizedSet {
    pub clean: Vec<OrganizedRecord>,
    pub excluded: Vec<OrganizedRecord>,
    pub no_match: Vec<OrganizedRecord>,
}

impl OrganizedSet {
    pub fn total(&self) -> usize {
        self.clean.len() + self.excluded.len() + self.no_match.len()
    }
}

/// Checks that every column the mapping names exists in the primary
/// sheet header before any records are processed.
pub fn validate_mapping(primary: &SheetTable, mapping: &ModuleMapping) -> Result<()> {
    for column in mapping.required_primary_columns() {
        if primary.column_index(column).is_none() {
            return Err(MigrationError::SchemaMismatch {
                sheet: primary.name.clone(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Assigns each merged record to its bucket.
pub fn organize(merged: Vec<MergedRecord>, mapping: &ModuleMapping) -> OrganizedSet {
    let mut set = OrganizedSet::default();
    for record in merged {
        if !record.is_matched() {
            set.no_match.push(OrganizedRecord {
                merged: record,
                bucket: Bucket::NoMatch,
                exclusion_reason: None,
            });
            continue;
        }
        match exclusion_reason(&record, mapping) {
            Some(reason) => set.excluded.push(OrganizedRecord {
                merged: record,
                bucket: Bucket::Excluded,
                exclusion_reason: Some(reason),
            }),
            None => set.clean.push(OrganizedRecord {
                merged: record,
                bucket: Bucket::Clean,
                exclusion_reason: None,
            }),
        }
    }
    debug!(
        clean = set.clean.len(),
        excluded = set.excluded.len(),
        no_match = set.no_match.len(),
        "records organized"
    );
    set
}

fn exclusion_reason(record: &MergedRecord, mapping: &ModuleMapping) -> Option<String> {
    if let Some(flag_column) = &mapping.deleted_flag {
        if record
            .record
            .get(flag_column)
            .is_some_and(is_truthy_flag)
        {
            return Some("deleted flag set".to_string());
        }
    }
    if record.record.get(&mapping.attention_id).is_none() {
        return Some(format!("missing {}", mapping.attention_id));
    }
    if record.record.get(&mapping.patient_id).is_none() {
        return Some(format!("missing {}", mapping.patient_id));
    }
    match record.record.get(&mapping.date) {
        None => Some("invalid date".to_string()),
        Some(value) if parse_date(value).is_none() => Some("invalid date".to_string()),
        Some(_) => None,
    }
}

/// Soft-delete markers the source systems use. `IsDeleted` is usually a
/// numeric 0/1 column but some exports carry localized booleans.
fn is_truthy_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "1.0" | "true" | "yes" | "si" | "sí"
    )
}
