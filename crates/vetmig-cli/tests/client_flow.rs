//! Client store and processing flow against a scaffolded client.

use tempfile::TempDir;
use vetmig_cli::cli::ProcessArgs;
use vetmig_cli::clients::ClientStore;
use vetmig_cli::commands::run_process;
use vetmig_cli::types::{ModuleRun, ProcessResult};
use vetmig_core::run_module;
use vetmig_ingest::Workbook;
use vetmig_model::{MigrationError, ModuleKind, SourceSystem};
use vetmig_report::write_module_reports;

fn process_args(client: &str) -> ProcessArgs {
    ProcessArgs {
        client: client.to_string(),
        source: None,
        output_dir: None,
        modules: Vec::new(),
        dry_run: false,
    }
}

#[test]
fn scaffolded_client_processes_a_workbook() {
    let workbook_dir = TempDir::new().unwrap();
    std::fs::write(
        workbook_dir.path().join("pacientevacuna.csv"),
        "PatientVaccineId,PatientId,VaccineId,DataDate,Note,IsDeleted\n\
         100,1,7,2023-01-15,Peso: 4.5 kg,0\n\
         101,2,7,2023-02-01,,0\n",
    )
    .unwrap();
    std::fs::write(
        workbook_dir.path().join("vacunas.csv"),
        "VaccineId,Name,Description\n7,Vacuna Triple,Primera dosis\n",
    )
    .unwrap();

    let clients_dir = TempDir::new().unwrap();
    let store = ClientStore::new(clients_dir.path());
    let (slug, config_path) = store
        .create("Clinica Central", SourceSystem::Veterinary, workbook_dir.path())
        .unwrap();
    assert_eq!(slug, "clinica_central");

    // Narrow the scaffold to the vaccine module, as an operator would.
    let mut config = store.load(&slug).unwrap();
    config.modules = vec![ModuleKind::Vacuna];
    std::fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let config = store.load(&slug).unwrap();
    assert_eq!(config.modules, vec![ModuleKind::Vacuna]);

    let workbook = Workbook::open(&config.source_path).unwrap();
    let output_dir = store.client_dir(&slug).join("output");
    let mut result = ProcessResult {
        client: slug.clone(),
        output_dir: output_dir.clone(),
        dry_run: false,
        modules: Vec::new(),
        errors: Vec::new(),
    };
    for module in &config.modules {
        let mapping = config.mapping_for(*module);
        let outcome = run_module(&workbook, *module, &mapping, config.tie_break).unwrap();
        let reports = write_module_reports(&output_dir, &outcome).unwrap();
        result.modules.push(ModuleRun::from_outcome(&outcome, Some(reports)));
    }

    assert!(!result.has_errors());
    assert_eq!(result.modules.len(), 1);
    let run = &result.modules[0];
    assert_eq!(run.input_rows, 2);
    assert_eq!(run.clean, 2);
    assert_eq!(run.output_rows, 2);
    assert_eq!(run.with_vitals, 1);

    let import = output_dir.join("vacuna_import_transformed.csv");
    let body = std::fs::read_to_string(import).unwrap();
    assert!(body.starts_with("ID ATENCION,ID MASCOTA,FECHA,NOTAS\n"));
    assert!(body.contains("Vacuna Triple // Peso: 4.5 kg // Primera dosis"));
}

#[test]
fn report_write_failure_does_not_abort_other_modules() {
    let workbook_dir = TempDir::new().unwrap();
    std::fs::write(
        workbook_dir.path().join("pacientevacuna.csv"),
        "PatientVaccineId,PatientId,VaccineId,DataDate,Note,IsDeleted\n\
         100,1,7,2023-01-15,,0\n",
    )
    .unwrap();
    std::fs::write(
        workbook_dir.path().join("vacunas.csv"),
        "VaccineId,Name,Description\n7,Vacuna Triple,\n",
    )
    .unwrap();
    std::fs::write(
        workbook_dir.path().join("apuntes.csv"),
        "NoteId,PatientId,DataDate,Title,Note,IsDeleted\n\
         200,1,2023-03-05,Revision,Todo normal,0\n",
    )
    .unwrap();
    std::fs::write(
        workbook_dir.path().join("mascotas.csv"),
        "PatientId,Species\n1,Canina\n",
    )
    .unwrap();

    let clients_dir = TempDir::new().unwrap();
    let store = ClientStore::new(clients_dir.path());
    let (slug, config_path) = store
        .create("Clinica Norte", SourceSystem::Veterinary, workbook_dir.path())
        .unwrap();
    let mut config = store.load(&slug).unwrap();
    config.modules = vec![ModuleKind::Vacuna, ModuleKind::Nota];
    std::fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    // A directory squatting on the summary path makes every vacuna
    // report write fail; nota must still run and write its files.
    let output_dir = store.client_dir(&slug).join("output");
    std::fs::create_dir_all(output_dir.join("vacuna_summary.csv")).unwrap();

    let result = run_process(&store, &process_args(&slug)).unwrap();

    assert!(result.has_errors());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("vacuna:"));
    assert_eq!(result.modules.len(), 2);
    assert!(result.modules[0].reports.is_none());
    assert!(result.modules[1].reports.is_some());
    assert!(output_dir.join("nota_import_transformed.csv").is_file());
}

#[test]
fn inactive_client_refuses_to_process() {
    let workbook_dir = TempDir::new().unwrap();
    let clients_dir = TempDir::new().unwrap();
    let store = ClientStore::new(clients_dir.path());
    let (slug, config_path) = store
        .create("Clinica Sur", SourceSystem::Qvet, workbook_dir.path())
        .unwrap();
    let mut config = store.load(&slug).unwrap();
    config.active = false;
    std::fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let error = run_process(&store, &process_args(&slug)).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<MigrationError>(),
        Some(MigrationError::Config(message)) if message.contains(&slug)
    ));
}
