//! Workbook access: a directory of CSV sheets, one file per sheet.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IngestError, Result};
use crate::sheet::{SheetTable, read_sheet};

/// A client workbook on disk.
///
/// Sheet names are file stems; lookup is case-insensitive so configuration
/// can name sheets the way the source system labels them.
#[derive(Debug, Clone)]
pub struct Workbook {
    root: PathBuf,
}

impl Workbook {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(IngestError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Lists sheet names, sorted.
    pub fn sheet_names(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| IngestError::DirectoryRead {
            path: self.root.clone(),
            source,
        })?;
        let mut names = Vec::new();
        for entry_result in entries {
            let entry = entry_result.map_err(|source| IngestError::DirectoryRead {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if !is_csv {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Resolves a sheet name to its file path, case-insensitively.
    fn sheet_path(&self, sheet: &str) -> Result<PathBuf> {
        let exact = self.root.join(format!("{sheet}.csv"));
        if exact.is_file() {
            return Ok(exact);
        }
        for name in self.sheet_names()? {
            if name.eq_ignore_ascii_case(sheet) {
                return Ok(self.root.join(format!("{name}.csv")));
            }
        }
        Err(IngestError::SheetNotFound {
            sheet: sheet.to_string(),
        })
    }

    pub fn has_sheet(&self, sheet: &str) -> bool {
        self.sheet_path(sheet).is_ok()
    }

    /// Reads a sheet by name.
    pub fn sheet(&self, sheet: &str) -> Result<SheetTable> {
        let path = self.sheet_path(sheet)?;
        let table = read_sheet(&path, sheet)?;
        debug!(
            sheet = %sheet,
            path = %path.display(),
            rows = table.rows.len(),
            columns = table.headers.len(),
            "sheet read"
        );
        Ok(table)
    }
}
