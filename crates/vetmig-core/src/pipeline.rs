//! Runs the pipeline stages for one module of one client workbook.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};
use vetmig_ingest::Workbook;
use vetmig_model::{
    ExtractedVitals, MigrationError, ModuleKind, ModuleMapping, OrganizedRecord, TieBreakPolicy,
    UnifiedRecord,
};

use crate::analyze::{SheetProfile, analyze_sheet};
use crate::extract::extract_vitals;
use crate::merge::{Catalog, merge};
use crate::organize::{OrganizedSet, organize, validate_mapping};
use crate::transform::transform;

/// Everything one module run produces; the report layer persists it.
#[derive(Debug, Clone)]
pub struct ModuleOutcome {
    pub module: ModuleKind,
    /// Profiles of the primary and catalog sheets, primary first.
    pub profiles: Vec<SheetProfile>,
    pub input_rows: usize,
    pub organized: OrganizedSet,
    /// Vitals for each clean record, index-aligned with `organized.clean`.
    pub vitals: Vec<ExtractedVitals>,
    pub transformed: Vec<UnifiedRecord>,
    pub late_exclusions: Vec<OrganizedRecord>,
    pub duplicate_count: usize,
}

impl ModuleOutcome {
    /// Total records excluded, organizer and transform stages combined.
    pub fn excluded_total(&self) -> usize {
        self.organized.excluded.len() + self.late_exclusions.len()
    }
}

/// Runs analyze → merge → organize → extract → transform for one module.
///
/// Fatal conditions (missing sheet, mapped column absent from the
/// header) abort the module; record-level failures land in buckets and
/// the run completes.
pub fn run_module(
    workbook: &Workbook,
    module: ModuleKind,
    mapping: &ModuleMapping,
    tie_break: TieBreakPolicy,
) -> Result<ModuleOutcome> {
    let module_started = Instant::now();
    let span = info_span!("module", module = %module);
    let _guard = span.enter();

    let started = Instant::now();
    let primary = workbook
        .sheet(&mapping.primary_sheet)
        .map_err(MigrationError::from)
        .with_context(|| format!("reading primary sheet '{}'", mapping.primary_sheet))?;
    let mut catalog_tables = Vec::with_capacity(mapping.catalog_sheets.len());
    for sheet in &mapping.catalog_sheets {
        let table = workbook
            .sheet(sheet)
            .map_err(MigrationError::from)
            .with_context(|| format!("reading catalog sheet '{sheet}'"))?;
        catalog_tables.push(table);
    }
    let mut profiles = vec![analyze_sheet(&primary)];
    profiles.extend(catalog_tables.iter().map(analyze_sheet));
    info!(
        stage = "analyze",
        rows = primary.rows.len(),
        catalogs = catalog_tables.len(),
        elapsed_ms = elapsed_ms(started),
        "sheets read and profiled"
    );

    validate_mapping(&primary, mapping)?;

    let started = Instant::now();
    let mut catalogs = Vec::with_capacity(catalog_tables.len());
    for table in &catalog_tables {
        catalogs.push(Catalog::from_sheet(table, &mapping.join_key)?);
    }
    let merged = merge(&primary, &catalogs, &mapping.join_key, tie_break)?;
    let input_rows = merged.len();
    info!(
        stage = "merge",
        rows = input_rows,
        matched = merged.iter().filter(|m| m.is_matched()).count(),
        elapsed_ms = elapsed_ms(started),
        "catalog join complete"
    );

    let started = Instant::now();
    let organized = organize(merged, mapping);
    info!(
        stage = "organize",
        clean = organized.clean.len(),
        excluded = organized.excluded.len(),
        no_match = organized.no_match.len(),
        elapsed_ms = elapsed_ms(started),
        "records organized"
    );

    let started = Instant::now();
    let vitals: Vec<ExtractedVitals> = match &mapping.note_text {
        Some(column) => organized
            .clean
            .iter()
            .map(|entry| {
                entry
                    .merged
                    .record
                    .get(column)
                    .map(extract_vitals)
                    .unwrap_or_default()
            })
            .collect(),
        None => vec![ExtractedVitals::default(); organized.clean.len()],
    };
    info!(
        stage = "extract",
        scanned = vitals.len(),
        with_vitals = vitals.iter().filter(|v| !v.is_empty()).count(),
        elapsed_ms = elapsed_ms(started),
        "vitals extracted"
    );

    let started = Instant::now();
    let output = transform(&organized.clean, mapping);
    info!(
        stage = "transform",
        records = output.records.len(),
        duplicates = output.duplicate_count,
        late_exclusions = output.late_exclusions.len(),
        elapsed_ms = elapsed_ms(started),
        "transform complete"
    );

    info!(
        module = %module,
        input_rows,
        output_rows = output.records.len(),
        elapsed_ms = elapsed_ms(module_started),
        "module complete"
    );
    Ok(ModuleOutcome {
        module,
        profiles,
        input_rows,
        organized,
        vitals,
        transformed: output.records,
        late_exclusions: output.late_exclusions,
        duplicate_count: output.duplicate_count,
    })
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
