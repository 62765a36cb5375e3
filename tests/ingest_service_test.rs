// Tests for whole-workbook and folder ingestion

mod common;

use calamine::Data;
use common::{ymd, GaugingSheet};
use std::fs;
use stream_gauge_service::importers::InMemoryWorkbook;
use stream_gauge_service::services::ingest_service::{
    ingest_folder, ingest_workbook, ingest_workbook_bytes, spreadsheet_files,
};
use stream_gauge_service::services::{IngestError, IngestReport};

fn field_workbook() -> InMemoryWorkbook {
    InMemoryWorkbook::new()
        .with_sheet("SiteA 2024-01-01", GaugingSheet::standard("SiteA", "2024-01-01").build())
        .with_sheet("Summary", GaugingSheet::new().build())
        .with_sheet("SiteA 2024-02-01!bad", GaugingSheet::standard("SiteA", "2024-02-01").build())
}

#[test]
fn test_ingest_skips_summary_and_flagged_sheets() {
    let report = ingest_workbook("field.xlsx", &mut field_workbook());

    assert_eq!(report.measurements.len(), 1);
    assert!(report.failures.is_empty());
    assert_eq!(report.measurements[0].site_code, "SiteA");
    assert_eq!(report.dates, vec![ymd(2024, 1, 1)]);
    assert_eq!(report.sites, vec!["SiteA".to_string()]);
    assert_eq!(report.date_labels(), vec!["2024/01/01".to_string()]);
}

#[test]
fn test_ingest_is_idempotent() {
    let first = ingest_workbook("field.xlsx", &mut field_workbook());
    let second = ingest_workbook("field.xlsx", &mut field_workbook());
    assert_eq!(first, second);
}

#[test]
fn test_bad_sheet_is_isolated() {
    let mut workbook = InMemoryWorkbook::new()
        .with_sheet("CC1 2024-01-01", GaugingSheet::standard("CC1", "2024-01-01").build())
        .with_sheet(
            "CC1 2024-02-01",
            GaugingSheet::new()
                .site("CC1")
                .date_text("2024-02-01")
                .point([0.0, 1.0, 0.0, 0.0, 0.0, 0.0])
                .build(),
        )
        .with_sheet(
            "CC2 undated",
            GaugingSheet::standard("CC2", "").build(),
        )
        .with_sheet("CC3 2024-03-01", GaugingSheet::standard("CC3", "2024-03-01").build());

    let report = ingest_workbook("field.xlsx", &mut workbook);

    let ingested: Vec<&str> = report
        .measurements
        .iter()
        .map(|m| m.sheet_name.as_str())
        .collect();
    assert_eq!(ingested, vec!["CC1 2024-01-01", "CC3 2024-03-01"]);

    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].sheet, "CC1 2024-02-01");
    assert_eq!(report.failures[0].kind, "division");
    assert_eq!(report.failures[1].sheet, "CC2 undated");
    assert_eq!(report.failures[1].kind, "validation");
    assert!(report.failures.iter().all(|f| f.workbook == "field.xlsx"));

    assert_eq!(report.sites, vec!["CC1".to_string(), "CC3".to_string()]);
}

#[test]
fn test_out_of_range_date_serial_fails_only_that_sheet() {
    let mut workbook = InMemoryWorkbook::new()
        .with_sheet("CC1 good", GaugingSheet::standard("CC1", "2024-01-01").build())
        .with_sheet(
            "CC2 bad",
            GaugingSheet::new()
                .site("CC2")
                .cell(2, 2, Data::Float(1e12))
                .points(&common::STANDARD_POINTS)
                .build(),
        );

    let report = ingest_workbook("field.xlsx", &mut workbook);

    assert_eq!(report.measurements.len(), 1);
    assert_eq!(report.measurements[0].site_code, "CC1");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].sheet, "CC2 bad");
    assert_eq!(report.failures[0].kind, "validation");
}

#[test]
fn test_duplicate_site_and_date_are_both_kept() {
    let mut workbook = InMemoryWorkbook::new()
        .with_sheet("CC1 am", GaugingSheet::standard("CC1", "2024-01-01").build())
        .with_sheet("CC1 pm", GaugingSheet::standard("CC1", "2024-01-01").build());

    let report = ingest_workbook("field.xlsx", &mut workbook);
    assert_eq!(report.measurements.len(), 2);
    assert_eq!(report.dates.len(), 1);
    assert_eq!(report.sites.len(), 1);
}

#[test]
fn test_distinct_lists_are_sorted() {
    let mut workbook = InMemoryWorkbook::new()
        .with_sheet("Z", GaugingSheet::standard("Z1", "2024-03-01").build())
        .with_sheet("A", GaugingSheet::standard("A1", "2024-01-01").build())
        .with_sheet("M", GaugingSheet::standard("M1", "2024-02-01").build());

    let report = ingest_workbook("field.xlsx", &mut workbook);
    assert_eq!(report.sites, vec!["A1", "M1", "Z1"]);
    assert_eq!(
        report.dates,
        vec![ymd(2024, 1, 1), ymd(2024, 2, 1), ymd(2024, 3, 1)]
    );
}

#[test]
fn test_merge_reports() {
    let a = ingest_workbook(
        "a.xlsx",
        &mut InMemoryWorkbook::new().with_sheet("S1", GaugingSheet::standard("S1", "2024-01-01").build()),
    );
    let b = ingest_workbook(
        "b.xlsx",
        &mut InMemoryWorkbook::new().with_sheet("S2", GaugingSheet::standard("S2", "2024-01-01").build()),
    );

    let merged = IngestReport::merge(vec![a, b]);
    assert_eq!(merged.measurements.len(), 2);
    assert_eq!(merged.sites, vec!["S1", "S2"]);
    assert_eq!(merged.dates, vec![ymd(2024, 1, 1)]);
}

#[test]
fn test_start_time_text_in_metadata() {
    let sheet = GaugingSheet::standard("CC1", "2024-01-01")
        .cell(2, 4, Data::String("09:30".to_string()));
    let report = ingest_workbook(
        "field.xlsx",
        &mut InMemoryWorkbook::new().with_sheet("CC1", sheet.build()),
    );
    assert_eq!(
        report.measurements[0].metadata.start_time.as_deref(),
        Some("09:30")
    );
}

#[test]
fn test_ingest_bytes_rejects_garbage() {
    let result = ingest_workbook_bytes("download", b"not a workbook".to_vec());
    assert!(matches!(result, Err(IngestError::WorkbookOpen { .. })));
}

#[test]
fn test_folder_scan_filters_and_skips_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "field notes").unwrap();
    fs::write(dir.path().join("broken.xlsx"), b"definitely not a zip").unwrap();
    fs::write(dir.path().join("also_broken.ods"), b"nope").unwrap();
    fs::create_dir(dir.path().join("archive.xlsx")).unwrap();

    let files = spreadsheet_files(dir.path()).unwrap();
    let names: Vec<String> = files
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["also_broken.ods", "broken.xlsx"]);

    let report = ingest_folder(dir.path()).unwrap();
    assert!(report.measurements.is_empty());
    assert!(report.sites.is_empty());
}

#[test]
fn test_folder_missing_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nowhere");
    assert!(matches!(
        ingest_folder(&missing),
        Err(IngestError::Io { .. })
    ));
}
