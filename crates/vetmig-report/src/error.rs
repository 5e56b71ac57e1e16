//! Error types for report writing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not create report directory: {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write report: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("could not flush report: {path}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReportError>;
