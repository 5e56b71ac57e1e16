//! Per-client configuration for the migration pipeline.
//!
//! Configuration is an explicitly constructed value handed to each pipeline
//! invocation. Field mappings resolve per source system with per-module
//! overrides from the client's `config.json`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Source practice-management system a client exports from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSystem {
    Veterinary,
    Qvet,
    Gvet,
    Cuvet,
}

impl SourceSystem {
    pub const ALL: [SourceSystem; 4] = [
        SourceSystem::Veterinary,
        SourceSystem::Qvet,
        SourceSystem::Gvet,
        SourceSystem::Cuvet,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            SourceSystem::Veterinary => "veterinary",
            SourceSystem::Qvet => "qvet",
            SourceSystem::Gvet => "gvet",
            SourceSystem::Cuvet => "cuvet",
        }
    }
}

impl fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Data-type module of the pipeline; each runs independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Control measurements (weights, routine checks).
    Control,
    /// Consultations and procedures.
    Consulta,
    /// Vaccinations.
    Vacuna,
    /// Free-form clinical notes.
    Nota,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 4] = [
        ModuleKind::Control,
        ModuleKind::Consulta,
        ModuleKind::Vacuna,
        ModuleKind::Nota,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ModuleKind::Control => "control",
            ModuleKind::Consulta => "consulta",
            ModuleKind::Vacuna => "vacuna",
            ModuleKind::Nota => "nota",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Policy for resolving a key present in more than one catalog sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakPolicy {
    /// First catalog sheet in configured order wins.
    #[default]
    FirstCatalog,
    /// Last catalog sheet in configured order wins.
    LastCatalog,
}

/// Column mapping for one module: canonical field name → source column name.
///
/// Validated against the actual sheet header before processing; a missing
/// required target is a `SchemaMismatch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMapping {
    /// Sheet holding the module's primary records.
    pub primary_sheet: String,
    /// Reference sheets joined against the primary, in tie-break order.
    pub catalog_sheets: Vec<String>,
    /// Key column the join resolves on (present in primary and catalogs).
    pub join_key: String,
    /// Source column for the attention-event identifier.
    pub attention_id: String,
    /// Source column for the patient identifier.
    pub patient_id: String,
    /// Source column for the event date.
    pub date: String,
    /// Notas composition columns, concatenated in this fixed order.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-text column scanned for vital signs; extraction is skipped
    /// when absent.
    #[serde(default)]
    pub note_text: Option<String>,
    /// Soft-delete marker column; truthy values exclude the record.
    #[serde(default)]
    pub deleted_flag: Option<String>,
}

impl ModuleMapping {
    /// Built-in mapping for a source system and module.
    ///
    /// The veterinary layout is the reference; the other systems export the
    /// same shapes under the same names and differ only in sheets clients
    /// override through `config.json`, so one mapping table serves them all.
    pub fn default_for(_system: SourceSystem, module: ModuleKind) -> Self {
        match module {
            ModuleKind::Control => Self {
                primary_sheet: "datosdecontrol".to_string(),
                catalog_sheets: vec!["mascotas".to_string()],
                join_key: "PatientId".to_string(),
                attention_id: "ControlDataGenericId".to_string(),
                patient_id: "PatientId".to_string(),
                date: "DataDate".to_string(),
                name: Some("Key".to_string()),
                note: Some("ValueString".to_string()),
                description: Some("Unit".to_string()),
                note_text: Some("ValueString".to_string()),
                deleted_flag: Some("IsDeleted".to_string()),
            },
            ModuleKind::Consulta => Self {
                primary_sheet: "consultas".to_string(),
                catalog_sheets: vec!["procedimientos".to_string()],
                join_key: "ProcedureId".to_string(),
                attention_id: "PatientInterventionId".to_string(),
                patient_id: "PatientId".to_string(),
                date: "DataDate".to_string(),
                name: Some("Name".to_string()),
                note: Some("Note".to_string()),
                description: Some("Description".to_string()),
                note_text: Some("Note".to_string()),
                deleted_flag: Some("IsDeleted".to_string()),
            },
            ModuleKind::Vacuna => Self {
                primary_sheet: "pacientevacuna".to_string(),
                catalog_sheets: vec!["vacunas".to_string()],
                join_key: "VaccineId".to_string(),
                attention_id: "PatientVaccineId".to_string(),
                patient_id: "PatientId".to_string(),
                date: "DataDate".to_string(),
                name: Some("Name".to_string()),
                note: Some("Note".to_string()),
                description: Some("Description".to_string()),
                note_text: Some("Note".to_string()),
                deleted_flag: Some("IsDeleted".to_string()),
            },
            ModuleKind::Nota => Self {
                primary_sheet: "apuntes".to_string(),
                catalog_sheets: vec!["mascotas".to_string()],
                join_key: "PatientId".to_string(),
                attention_id: "NoteId".to_string(),
                patient_id: "PatientId".to_string(),
                date: "DataDate".to_string(),
                name: Some("Title".to_string()),
                note: Some("Note".to_string()),
                description: None,
                note_text: Some("Note".to_string()),
                deleted_flag: Some("IsDeleted".to_string()),
            },
        }
    }

    /// Columns that must be present in the primary sheet header.
    pub fn required_primary_columns(&self) -> Vec<&str> {
        vec![
            self.join_key.as_str(),
            self.attention_id.as_str(),
            self.patient_id.as_str(),
            self.date.as_str(),
        ]
    }
}

/// One client's migration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Display name.
    pub name: String,
    /// Workbook directory (one CSV file per sheet).
    pub source_path: PathBuf,
    /// Inactive clients are listed but refuse to process.
    #[serde(default = "default_active")]
    pub active: bool,
    pub system: SourceSystem,
    /// Modules enabled for this client.
    #[serde(default = "default_modules")]
    pub modules: Vec<ModuleKind>,
    #[serde(default)]
    pub tie_break: TieBreakPolicy,
    /// Per-module mapping overrides; unlisted modules use the system default.
    #[serde(default)]
    pub mappings: BTreeMap<ModuleKind, ModuleMapping>,
}

fn default_active() -> bool {
    true
}

fn default_modules() -> Vec<ModuleKind> {
    ModuleKind::ALL.to_vec()
}

impl ClientConfig {
    pub fn new(name: impl Into<String>, source_path: PathBuf, system: SourceSystem) -> Self {
        Self {
            name: name.into(),
            source_path,
            active: true,
            system,
            modules: default_modules(),
            tie_break: TieBreakPolicy::default(),
            mappings: BTreeMap::new(),
        }
    }

    /// Resolves the effective mapping for a module.
    pub fn mapping_for(&self, module: ModuleKind) -> ModuleMapping {
        self.mappings
            .get(&module)
            .cloned()
            .unwrap_or_else(|| ModuleMapping::default_for(self.system, module))
    }
}
