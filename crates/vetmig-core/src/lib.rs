//! Pipeline stages for the veterinary record migration.
//!
//! The stages compose in a fixed order per module: analyze (diagnostic
//! profiling), merge (catalog join), organize (bucket routing), extract
//! (vital signs from note text), transform (unified import shape).
//! [`pipeline::run_module`] drives the whole sequence for one module.

pub mod analyze;
pub mod dates;
pub mod extract;
pub mod merge;
pub mod organize;
pub mod pipeline;
pub mod transform;

pub use analyze::{ColumnKind, ColumnProfile, SheetProfile, analyze_sheet};
pub use dates::{format_date, parse_date};
pub use extract::extract_vitals;
pub use merge::{Catalog, merge};
pub use organize::{OrganizedSet, organize, validate_mapping};
pub use pipeline::{ModuleOutcome, run_module};
pub use transform::{TransformOutput, transform};
