//! Result types shared by the process command and the summary printer.

use std::path::PathBuf;

use vetmig_core::ModuleOutcome;
use vetmig_model::ModuleKind;
use vetmig_report::ModuleReportPaths;

/// Counts for one completed module run.
#[derive(Debug)]
pub struct ModuleRun {
    pub module: ModuleKind,
    pub input_rows: usize,
    pub clean: usize,
    pub excluded: usize,
    pub no_match: usize,
    pub duplicates: usize,
    pub with_vitals: usize,
    pub output_rows: usize,
    /// Absent on dry runs.
    pub reports: Option<ModuleReportPaths>,
}

impl ModuleRun {
    pub fn from_outcome(outcome: &ModuleOutcome, reports: Option<ModuleReportPaths>) -> Self {
        Self {
            module: outcome.module,
            input_rows: outcome.input_rows,
            clean: outcome.organized.clean.len(),
            excluded: outcome.excluded_total(),
            no_match: outcome.organized.no_match.len(),
            duplicates: outcome.duplicate_count,
            with_vitals: outcome.vitals.iter().filter(|v| !v.is_empty()).count(),
            output_rows: outcome.transformed.len(),
            reports,
        }
    }
}

/// Outcome of processing one client.
#[derive(Debug)]
pub struct ProcessResult {
    pub client: String,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub modules: Vec<ModuleRun>,
    /// Module-level failures; the run continues past them.
    pub errors: Vec<String>,
}

impl ProcessResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
