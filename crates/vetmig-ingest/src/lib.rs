pub mod error;
pub mod profile;
pub mod sheet;
pub mod workbook;

pub use error::{IngestError, Result};
pub use profile::{ColumnHint, build_column_hints};
pub use sheet::{SheetTable, read_sheet};
pub use workbook::Workbook;
