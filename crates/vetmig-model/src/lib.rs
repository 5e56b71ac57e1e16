pub mod config;
pub mod error;
pub mod record;

pub use config::{ClientConfig, ModuleKind, ModuleMapping, SourceSystem, TieBreakPolicy};
pub use error::{MigrationError, Result};
pub use record::{
    Bucket, ExtractedVitals, MatchStatus, MergedRecord, NOTAS_DELIMITER, OrganizedRecord, Record,
    UnifiedRecord, compose_notas,
};
