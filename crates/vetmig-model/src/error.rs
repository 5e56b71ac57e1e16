//! Error types for the migration pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort processing of a client or module.
///
/// Record-level problems (unparseable dates, missing keys) are never
/// represented here; those route records to the excluded/no-match buckets
/// and the pipeline continues.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Source workbook or sheet file missing or unreadable.
    #[error("input not readable: {path}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Expected sheet is absent from the workbook.
    #[error("sheet not found: {sheet}")]
    SheetNotFound { sheet: String },

    /// A mapped column is absent from the sheet header.
    #[error("sheet '{sheet}' is missing required column '{column}'")]
    SchemaMismatch { sheet: String, column: String },

    /// Client configuration is missing, malformed, or inactive.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MigrationError>;
