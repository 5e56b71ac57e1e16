//! Error types for workbook ingestion.

use std::path::PathBuf;
use thiserror::Error;
use vetmig_model::MigrationError;

/// Errors that can occur while reading a client workbook.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Workbook directory not found or not readable.
    #[error("workbook directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Named sheet is absent from the workbook.
    #[error("sheet not found in workbook: {sheet}")]
    SheetNotFound { sheet: String },

    /// Failed to parse a sheet file.
    #[error("failed to parse sheet {path}: {source}")]
    SheetParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Lifts ingest failures into the pipeline error taxonomy: sheet
/// lookups keep their name, everything else is an input failure on the
/// offending path.
impl From<IngestError> for MigrationError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::DirectoryNotFound { path } => MigrationError::Input {
                path,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
            },
            IngestError::DirectoryRead { path, source } => MigrationError::Input { path, source },
            IngestError::SheetNotFound { sheet } => MigrationError::SheetNotFound { sheet },
            IngestError::SheetParse { path, source } => MigrationError::Input {
                path,
                source: std::io::Error::other(source),
            },
        }
    }
}
