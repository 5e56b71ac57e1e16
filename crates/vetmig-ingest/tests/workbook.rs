//! Workbook reading against fixture directories.

use tempfile::TempDir;
use vetmig_ingest::{Workbook, build_column_hints, read_sheet};

fn fixture_workbook() -> (TempDir, Workbook) {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("pacientevacuna.csv"),
        "PatientVaccineId,PatientId,VaccineId,DataDate,Note\n\
         100,1,7,2023-01-15,Peso: 4.5 kg\n\
         101,2,8,2023-02-01,\n\
         \n\
         102,1,9,2023-03-10,control anual\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("vacunas.csv"),
        "VaccineId,Name,Description\n7,Triple,Primera dosis\n8,Rabia,\n",
    )
    .unwrap();
    let workbook = Workbook::open(dir.path()).unwrap();
    (dir, workbook)
}

#[test]
fn reads_sheets_and_skips_blank_rows() {
    let (_dir, workbook) = fixture_workbook();
    let primary = workbook.sheet("pacientevacuna").unwrap();
    assert_eq!(primary.rows.len(), 3);
    assert_eq!(
        primary.headers,
        vec!["PatientVaccineId", "PatientId", "VaccineId", "DataDate", "Note"]
    );

    let record = primary.record(0).unwrap();
    assert_eq!(record.get("Note"), Some("Peso: 4.5 kg"));
    assert_eq!(record.get("PatientVaccineId"), Some("100"));
}

#[test]
fn short_rows_pad_to_header_width() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("consultas.csv");
    std::fs::write(&path, "A,B,C\n1,2\n").unwrap();
    let table = read_sheet(&path, "consultas").unwrap();
    assert_eq!(table.rows[0], vec!["1", "2", ""]);
}

#[test]
fn hints_describe_catalog_sheet() {
    let (_dir, workbook) = fixture_workbook();
    let catalog = workbook.sheet("vacunas").unwrap();
    let hints = build_column_hints(&catalog);
    assert!(hints["VaccineId"].is_numeric);
    assert!(!hints["Name"].is_numeric);
    assert_eq!(hints["Description"].non_null, 1);
}

#[test]
fn empty_sheet_yields_empty_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vacia.csv");
    std::fs::write(&path, "").unwrap();
    let table = read_sheet(&path, "vacia").unwrap();
    assert!(table.headers.is_empty());
    assert!(table.rows.is_empty());
}
