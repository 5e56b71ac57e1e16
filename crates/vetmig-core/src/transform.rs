//! Final mapping of clean records into the unified import shape.

use std::collections::BTreeSet;

use tracing::debug;
use vetmig_model::{
    Bucket, ModuleMapping, OrganizedRecord, UnifiedRecord, compose_notas,
};

use crate::dates::parse_date;

/// Result of the transform stage.
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    /// Records in input order, duplicates removed.
    pub records: Vec<UnifiedRecord>,
    /// Records that failed the invariant re-check inside the transform.
    /// Empty when the input actually came from the organizer.
    pub late_exclusions: Vec<OrganizedRecord>,
    /// Duplicate attention ids dropped (first occurrence kept).
    pub duplicate_count: usize,
}

/// Maps clean records to `UnifiedRecord`s.
///
/// `NOTAS` concatenates the mapped name, note, and description columns
/// in that fixed order. Attention ids are deduplicated keep-first.
/// Identifiers and dates are re-validated here; failures are reported
/// as late exclusions, not dropped.
pub fn transform(clean: &[OrganizedRecord], mapping: &ModuleMapping) -> TransformOutput {
    let mut output = TransformOutput::default();
    let mut seen = BTreeSet::new();
    for organized in clean {
        let record = &organized.merged.record;
        let Some(id_atencion) = record.get(&mapping.attention_id) else {
            output
                .late_exclusions
                .push(late_exclusion(organized, format!("missing {}", mapping.attention_id)));
            continue;
        };
        let Some(id_mascota) = record.get(&mapping.patient_id) else {
            output
                .late_exclusions
                .push(late_exclusion(organized, format!("missing {}", mapping.patient_id)));
            continue;
        };
        let Some(fecha) = record.get(&mapping.date).and_then(parse_date) else {
            output
                .late_exclusions
                .push(late_exclusion(organized, "invalid date".to_string()));
            continue;
        };
        if !seen.insert(id_atencion.to_string()) {
            output.duplicate_count += 1;
            continue;
        }

        let parts = [
            mapping.name.as_deref(),
            mapping.note.as_deref(),
            mapping.description.as_deref(),
        ];
        let notas = compose_notas(
            parts
                .into_iter()
                .flatten()
                .filter_map(|column| record.get(column)),
        );
        output.records.push(UnifiedRecord {
            id_atencion: id_atencion.to_string(),
            id_mascota: id_mascota.to_string(),
            fecha,
            notas,
        });
    }
    debug!(
        records = output.records.len(),
        duplicates = output.duplicate_count,
        late_exclusions = output.late_exclusions.len(),
        "transform complete"
    );
    output
}

fn late_exclusion(organized: &OrganizedRecord, reason: String) -> OrganizedRecord {
    OrganizedRecord {
        merged: organized.merged.clone(),
        bucket: Bucket::Excluded,
        exclusion_reason: Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use vetmig_model::{MatchStatus, MergedRecord, ModuleKind, Record, SourceSystem};

    fn mapping() -> ModuleMapping {
        ModuleMapping::default_for(SourceSystem::Veterinary, ModuleKind::Vacuna)
    }

    fn clean(fields: &[(&str, &str)]) -> OrganizedRecord {
        let mut record = Record::new(0);
        for (column, value) in fields {
            record.set(*column, *value);
        }
        OrganizedRecord {
            merged: MergedRecord {
                record,
                status: MatchStatus::Matched,
                catalog: Some("vacunas".to_string()),
            },
            bucket: Bucket::Clean,
            exclusion_reason: None,
        }
    }

    #[test]
    fn notas_concatenates_in_fixed_order() {
        let record = clean(&[
            ("PatientVaccineId", "100"),
            ("PatientId", "1"),
            ("DataDate", "2023-01-15"),
            ("Name", "Vacuna Triple"),
            ("Note", "Aplicada correctamente"),
            ("Description", "Primera dosis"),
        ]);
        let output = transform(&[record], &mapping());
        assert_eq!(output.records.len(), 1);
        assert_eq!(
            output.records[0].notas,
            "Vacuna Triple // Aplicada correctamente // Primera dosis"
        );
        assert_eq!(output.records[0].id_atencion, "100");
        assert_eq!(output.records[0].id_mascota, "1");
        assert_eq!(
            output.records[0].fecha,
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
        );
    }

    #[test]
    fn empty_notas_parts_are_skipped() {
        let record = clean(&[
            ("PatientVaccineId", "100"),
            ("PatientId", "1"),
            ("DataDate", "2023-01-15"),
            ("Name", "Rabia"),
            ("Note", "   "),
        ]);
        let output = transform(&[record], &mapping());
        assert_eq!(output.records[0].notas, "Rabia");
    }

    #[test]
    fn duplicate_attention_ids_keep_first() {
        let first = clean(&[
            ("PatientVaccineId", "100"),
            ("PatientId", "1"),
            ("DataDate", "2023-01-15"),
            ("Note", "primera"),
        ]);
        let duplicate = clean(&[
            ("PatientVaccineId", "100"),
            ("PatientId", "1"),
            ("DataDate", "2023-02-20"),
            ("Note", "segunda"),
        ]);
        let other = clean(&[
            ("PatientVaccineId", "101"),
            ("PatientId", "2"),
            ("DataDate", "2023-03-01"),
        ]);
        let output = transform(&[first, duplicate, other], &mapping());
        assert_eq!(output.records.len(), 2);
        assert_eq!(output.duplicate_count, 1);
        assert_eq!(output.records[0].notas, "primera");
        assert_eq!(output.records[1].id_atencion, "101");
    }

    #[test]
    fn invalid_rows_become_late_exclusions() {
        let bad_date = clean(&[
            ("PatientVaccineId", "100"),
            ("PatientId", "1"),
            ("DataDate", "mañana"),
        ]);
        let missing_patient = clean(&[
            ("PatientVaccineId", "101"),
            ("DataDate", "2023-01-15"),
        ]);
        let output = transform(&[bad_date, missing_patient], &mapping());
        assert!(output.records.is_empty());
        assert_eq!(output.late_exclusions.len(), 2);
        assert_eq!(
            output.late_exclusions[0].exclusion_reason.as_deref(),
            Some("invalid date")
        );
        assert_eq!(
            output.late_exclusions[1].exclusion_reason.as_deref(),
            Some("missing PatientId")
        );
    }
}
