//! Report and import-file writers for migration runs.

pub mod error;
pub mod writer;

pub use error::{ReportError, Result};
pub use writer::{ModuleReportPaths, write_module_reports};
