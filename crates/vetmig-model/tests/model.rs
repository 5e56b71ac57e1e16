use std::path::PathBuf;

use vetmig_model::{ClientConfig, ModuleKind, ModuleMapping, SourceSystem, TieBreakPolicy};

#[test]
fn config_round_trips_through_json() {
    let mut config = ClientConfig::new(
        "Huron Azul",
        PathBuf::from("clients/huron_azul/raw_data"),
        SourceSystem::Veterinary,
    );
    config.modules = vec![ModuleKind::Vacuna, ModuleKind::Control];
    config.tie_break = TieBreakPolicy::LastCatalog;

    let json = serde_json::to_string_pretty(&config).expect("serialize config");
    let round: ClientConfig = serde_json::from_str(&json).expect("deserialize config");
    assert_eq!(round.name, "Huron Azul");
    assert_eq!(round.system, SourceSystem::Veterinary);
    assert_eq!(round.modules, vec![ModuleKind::Vacuna, ModuleKind::Control]);
    assert_eq!(round.tie_break, TieBreakPolicy::LastCatalog);
}

#[test]
fn config_defaults_apply_when_fields_absent() {
    let json = r#"{
        "name": "Cuvet Centro",
        "source_path": "clients/cuvet/raw_data",
        "system": "cuvet"
    }"#;
    let config: ClientConfig = serde_json::from_str(json).expect("deserialize minimal config");
    assert!(config.active);
    assert_eq!(config.modules, ModuleKind::ALL.to_vec());
    assert_eq!(config.tie_break, TieBreakPolicy::FirstCatalog);
    assert!(config.mappings.is_empty());
}

#[test]
fn mapping_override_takes_precedence_over_default() {
    let mut config = ClientConfig::new(
        "Qvet Clinic",
        PathBuf::from("clients/qvet/raw_data"),
        SourceSystem::Qvet,
    );
    let mut custom = ModuleMapping::default_for(SourceSystem::Qvet, ModuleKind::Vacuna);
    custom.primary_sheet = "vacunaciones".to_string();
    config.mappings.insert(ModuleKind::Vacuna, custom.clone());

    assert_eq!(config.mapping_for(ModuleKind::Vacuna), custom);
    // Unlisted modules fall back to the system default.
    assert_eq!(
        config.mapping_for(ModuleKind::Nota),
        ModuleMapping::default_for(SourceSystem::Qvet, ModuleKind::Nota)
    );
}

#[test]
fn default_mappings_name_all_required_columns() {
    for module in ModuleKind::ALL {
        let mapping = ModuleMapping::default_for(SourceSystem::Veterinary, module);
        for column in mapping.required_primary_columns() {
            assert!(!column.is_empty(), "{module}: empty required column");
        }
        assert!(!mapping.primary_sheet.is_empty());
        assert!(!mapping.catalog_sheets.is_empty());
    }
}

#[test]
fn module_kind_serializes_as_lowercase_slug() {
    let json = serde_json::to_string(&ModuleKind::Consulta).expect("serialize module");
    assert_eq!(json, "\"consulta\"");
    assert_eq!(ModuleKind::Consulta.slug(), "consulta");
}
