//! Per-module report files.
//!
//! Each module run produces seven CSV files in the output directory:
//! the import file (`<module>_import_transformed.csv`), one file per
//! bucket, an attention→patient id map, the sheet analysis, and a run
//! summary. The summary is written first so a partially failed run
//! still leaves its counts behind.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::Writer;
use tracing::info;
use vetmig_core::{ModuleOutcome, format_date};
use vetmig_model::{ExtractedVitals, OrganizedRecord};

use crate::error::{ReportError, Result};

const IMPORT_HEADERS: [&str; 4] = ["ID ATENCION", "ID MASCOTA", "FECHA", "NOTAS"];
const VITALS_HEADERS: [&str; 4] = ["peso_kg", "temperatura_c", "fc_bpm", "fr_rpm"];

/// Paths of the files one module run produced.
#[derive(Debug, Clone)]
pub struct ModuleReportPaths {
    pub summary: PathBuf,
    pub import_transformed: PathBuf,
    pub clean: PathBuf,
    pub excluded: PathBuf,
    pub no_match: PathBuf,
    pub id_map: PathBuf,
    pub analysis: PathBuf,
}

/// Writes all report files for one module outcome.
pub fn write_module_reports(output_dir: &Path, outcome: &ModuleOutcome) -> Result<ModuleReportPaths> {
    std::fs::create_dir_all(output_dir).map_err(|source| ReportError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let module = outcome.module.slug();
    let paths = ModuleReportPaths {
        summary: output_dir.join(format!("{module}_summary.csv")),
        import_transformed: output_dir.join(format!("{module}_import_transformed.csv")),
        clean: output_dir.join(format!("{module}_clean.csv")),
        excluded: output_dir.join(format!("{module}_excluded.csv")),
        no_match: output_dir.join(format!("{module}_no_match.csv")),
        id_map: output_dir.join(format!("{module}_id_map.csv")),
        analysis: output_dir.join(format!("{module}_analysis.csv")),
    };

    write_summary(&paths.summary, outcome)?;
    write_analysis(&paths.analysis, outcome)?;
    write_import(&paths.import_transformed, outcome)?;
    write_clean(&paths.clean, outcome)?;
    write_excluded(&paths.excluded, outcome)?;
    write_bucket(&paths.no_match, &outcome.organized.no_match)?;
    write_id_map(&paths.id_map, outcome)?;

    info!(
        module = %outcome.module,
        output_dir = %output_dir.display(),
        records = outcome.transformed.len(),
        "module reports written"
    );
    Ok(paths)
}

fn write_summary(path: &Path, outcome: &ModuleOutcome) -> Result<()> {
    let mut writer = open(path)?;
    let with_vitals = outcome.vitals.iter().filter(|v| !v.is_empty()).count();
    let rows = [
        ("input_rows", outcome.input_rows),
        ("clean", outcome.organized.clean.len()),
        ("excluded", outcome.excluded_total()),
        ("no_match", outcome.organized.no_match.len()),
        ("duplicates_dropped", outcome.duplicate_count),
        ("with_vitals", with_vitals),
        ("output_rows", outcome.transformed.len()),
    ];
    write_row(&mut writer, path, ["metric", "value"])?;
    for (metric, value) in rows {
        write_row(&mut writer, path, [metric, value.to_string().as_str()])?;
    }
    let generated_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    write_row(&mut writer, path, ["generated_at", generated_at.as_str()])?;
    finish(writer, path)
}

fn write_analysis(path: &Path, outcome: &ModuleOutcome) -> Result<()> {
    let mut writer = open(path)?;
    write_row(
        &mut writer,
        path,
        ["sheet", "rows", "column", "kind", "null_ratio", "unique_ratio"],
    )?;
    for profile in &outcome.profiles {
        for column in &profile.columns {
            write_row(
                &mut writer,
                path,
                [
                    profile.sheet.as_str(),
                    profile.row_count.to_string().as_str(),
                    column.name.as_str(),
                    column.kind.label(),
                    format!("{:.3}", column.null_ratio).as_str(),
                    format!("{:.3}", column.unique_ratio).as_str(),
                ],
            )?;
        }
    }
    finish(writer, path)
}

fn write_import(path: &Path, outcome: &ModuleOutcome) -> Result<()> {
    let mut writer = open(path)?;
    write_row(&mut writer, path, IMPORT_HEADERS)?;
    for record in &outcome.transformed {
        write_row(
            &mut writer,
            path,
            [
                record.id_atencion.as_str(),
                record.id_mascota.as_str(),
                format_date(record.fecha).as_str(),
                record.notas.as_str(),
            ],
        )?;
    }
    finish(writer, path)
}

fn write_clean(path: &Path, outcome: &ModuleOutcome) -> Result<()> {
    let columns = union_columns(outcome.organized.clean.iter());
    let mut writer = open(path)?;
    let mut headers = vec!["row"];
    headers.extend(columns.iter().map(String::as_str));
    headers.extend(VITALS_HEADERS);
    write_row(&mut writer, path, headers)?;
    for (entry, vitals) in outcome.organized.clean.iter().zip(&outcome.vitals) {
        let mut row = vec![entry.merged.record.row_index.to_string()];
        for column in &columns {
            row.push(entry.merged.record.get(column).unwrap_or("").to_string());
        }
        row.extend(vitals_cells(vitals));
        write_row(&mut writer, path, row)?;
    }
    finish(writer, path)
}

fn write_excluded(path: &Path, outcome: &ModuleOutcome) -> Result<()> {
    let entries: Vec<&OrganizedRecord> = outcome
        .organized
        .excluded
        .iter()
        .chain(&outcome.late_exclusions)
        .collect();
    let columns = union_columns(entries.iter().copied());
    let mut writer = open(path)?;
    let mut headers = vec!["reason", "row"];
    headers.extend(columns.iter().map(String::as_str));
    write_row(&mut writer, path, headers)?;
    for entry in entries {
        let mut row = vec![
            entry.exclusion_reason.clone().unwrap_or_default(),
            entry.merged.record.row_index.to_string(),
        ];
        for column in &columns {
            row.push(entry.merged.record.get(column).unwrap_or("").to_string());
        }
        write_row(&mut writer, path, row)?;
    }
    finish(writer, path)
}

fn write_bucket(path: &Path, entries: &[OrganizedRecord]) -> Result<()> {
    let columns = union_columns(entries.iter());
    let mut writer = open(path)?;
    let mut headers = vec!["row"];
    headers.extend(columns.iter().map(String::as_str));
    write_row(&mut writer, path, headers)?;
    for entry in entries {
        let mut row = vec![entry.merged.record.row_index.to_string()];
        for column in &columns {
            row.push(entry.merged.record.get(column).unwrap_or("").to_string());
        }
        write_row(&mut writer, path, row)?;
    }
    finish(writer, path)
}

fn write_id_map(path: &Path, outcome: &ModuleOutcome) -> Result<()> {
    let mut writer = open(path)?;
    write_row(&mut writer, path, ["id_atencion", "id_mascota"])?;
    for record in &outcome.transformed {
        write_row(
            &mut writer,
            path,
            [record.id_atencion.as_str(), record.id_mascota.as_str()],
        )?;
    }
    finish(writer, path)
}

fn vitals_cells(vitals: &ExtractedVitals) -> Vec<String> {
    vec![
        vitals
            .weight_kg
            .map(|value| format!("{value:.2}"))
            .unwrap_or_default(),
        vitals
            .temperature_c
            .map(|value| format!("{value:.2}"))
            .unwrap_or_default(),
        vitals
            .heart_rate_bpm
            .map(|value| value.to_string())
            .unwrap_or_default(),
        vitals
            .respiratory_rate_rpm
            .map(|value| value.to_string())
            .unwrap_or_default(),
    ]
}

/// Sorted union of the column names across a set of records. Sheets can
/// gain catalog columns mid-join, so no single record is authoritative.
fn union_columns<'a>(entries: impl Iterator<Item = &'a OrganizedRecord>) -> Vec<String> {
    let mut columns = BTreeSet::new();
    for entry in entries {
        for column in entry.merged.record.fields.keys() {
            columns.insert(column.clone());
        }
    }
    columns.into_iter().collect()
}

fn open(path: &Path) -> Result<Writer<File>> {
    Writer::from_path(path).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_row<I, T>(writer: &mut Writer<File>, path: &Path, row: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    writer
        .write_record(row)
        .map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn finish(mut writer: Writer<File>, path: &Path) -> Result<()> {
    writer.flush().map_err(|source| ReportError::Flush {
        path: path.to_path_buf(),
        source,
    })
}
