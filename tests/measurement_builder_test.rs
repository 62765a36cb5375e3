// Tests for turning split sheet tables into validated measurements

mod common;

use calamine::Data;
use common::{ymd, GaugingSheet, STANDARD_POINTS};
use stream_gauge_service::importers::sheet_parser::split_sheet;
use stream_gauge_service::measurement::{build_from_tables, MeasurementError};

fn build(name: &str, sheet: GaugingSheet) -> Result<stream_gauge_service::measurement::Measurement, MeasurementError> {
    build_from_tables(&split_sheet(name, &sheet.build()))
}

#[test]
fn test_standard_sheet_totals() {
    let m = build("CC1 2024-01-15", GaugingSheet::standard("CC1", "2024-01-15")).unwrap();

    assert_eq!(m.site_code, "CC1");
    assert_eq!(m.date, ymd(2024, 1, 15));
    assert_eq!(m.date_label(), "2024/01/15");
    assert_eq!(m.discharge_cfs, 3.0);
    assert_eq!(m.area_sqft, 2.0);
    assert_eq!(m.average_velocity_fps, 1.5);
    assert_eq!(m.max_observed_depth_ft, 1.0);
    assert_eq!(m.average_depth_ft(), Some(1.0));
    assert_eq!(m.flow_data.len(), 3);
}

#[test]
fn test_discharge_and_velocity_properties() {
    let m = build("X 1", GaugingSheet::standard("X", "2024-05-05")).unwrap();

    let discharge: f64 = m.flow_data.iter().map(|s| s.point.discharge_cfs).sum();
    let area: f64 = m.flow_data.iter().map(|s| s.point.area_sqft).sum();
    assert_eq!(m.discharge_cfs, discharge);
    assert_eq!(m.average_velocity_fps, discharge / area);
    assert!(m
        .flow_data
        .iter()
        .all(|s| s.point.depth_ft <= m.max_observed_depth_ft));
}

#[test]
fn test_flow_samples_tagged_and_sorted() {
    let sheet = GaugingSheet::new()
        .site("CC2")
        .date_text("2024-02-01")
        .points(&[STANDARD_POINTS[2], STANDARD_POINTS[0], STANDARD_POINTS[1]]);
    let m = build("CC2 visit", sheet).unwrap();

    let distances: Vec<f64> = m.flow_data.iter().map(|s| s.point.distance_ft).collect();
    assert_eq!(distances, vec![0.0, 1.0, 2.0]);
    assert!(m
        .flow_data
        .iter()
        .all(|s| s.site_code == "CC2" && s.date_label == "2024/02/01"));
}

#[test]
fn test_site_code_falls_back_to_sheet_name() {
    let sheet = GaugingSheet::new()
        .date_text("2024-01-01")
        .points(&STANDARD_POINTS);
    let m = build("SLO3 2024-01-01", sheet).unwrap();
    assert_eq!(m.site_code, "SLO3");
}

#[test]
fn test_site_code_cell_wins_over_sheet_name() {
    let m = build("Wrong 2024-01-01", GaugingSheet::standard("Right", "2024-01-01")).unwrap();
    assert_eq!(m.site_code, "Right");
}

#[test]
fn test_crew_fallback_cell() {
    let sheet = GaugingSheet::standard("CC1", "2024-01-01")
        .cell(4, 2, Data::String("Ana Ruiz, Ben Cho".to_string()));
    let m = build("CC1", sheet).unwrap();
    assert_eq!(m.metadata.crew, vec!["Ana Ruiz", "Ben Cho"]);
}

#[test]
fn test_crew_primary_cell_preferred() {
    let sheet = GaugingSheet::standard("CC1", "2024-01-01")
        .crew("Dee Park")
        .cell(4, 2, Data::String("Ana Ruiz".to_string()));
    let m = build("CC1", sheet).unwrap();
    assert_eq!(m.metadata.crew, vec!["Dee Park"]);
}

#[test]
fn test_optional_metadata_fields() {
    let sheet = GaugingSheet::standard("CC1", "2024-01-01")
        .cell(0, 3, Data::String("Chorro Creek".to_string()))
        .cell(2, 13, Data::String("Flowtracker".to_string()));
    let m = build("CC1", sheet).unwrap();
    assert_eq!(m.metadata.station.as_deref(), Some("Chorro Creek"));
    assert_eq!(m.metadata.meter_type.as_deref(), Some("Flowtracker"));
    assert_eq!(m.metadata.coordinates, None);
    assert!(m.metadata.start_time.is_none());
}

#[test]
fn test_excel_serial_date() {
    // 45292 = 2024-01-01
    let sheet = GaugingSheet::new()
        .site("CC1")
        .cell(2, 2, Data::Float(45292.0))
        .points(&STANDARD_POINTS);
    let m = build("CC1", sheet).unwrap();
    assert_eq!(m.date, ymd(2024, 1, 1));
}

#[test]
fn test_zero_area_is_division_error() {
    let sheet = GaugingSheet::new()
        .site("CC1")
        .date_text("2024-01-01")
        .point([0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    let err = build("CC1", sheet).unwrap_err();
    assert_eq!(
        err,
        MeasurementError::Division {
            sheet: "CC1".to_string()
        }
    );
    assert_eq!(err.kind(), "division");
}

#[test]
fn test_no_flow_rows_is_division_error() {
    let sheet = GaugingSheet::new().site("CC1").date_text("2024-01-01");
    assert!(matches!(
        build("CC1", sheet),
        Err(MeasurementError::Division { .. })
    ));
}

#[test]
fn test_missing_column_is_data_format_error() {
    let sheet = GaugingSheet::standard("CC1", "2024-01-01")
        .cell(12, 3, Data::String("Velocity".to_string()));
    match build("CC1", sheet) {
        Err(MeasurementError::DataFormat { column, .. }) => assert_eq!(column, "V"),
        other => panic!("Expected DataFormat error, got {other:?}"),
    }
}

#[test]
fn test_missing_date_is_validation_error() {
    let sheet = GaugingSheet::new().site("CC1").points(&STANDARD_POINTS);
    let err = build("CC1", sheet).unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[test]
fn test_unreadable_date_is_validation_error() {
    let sheet = GaugingSheet::standard("CC1", "sometime in spring");
    assert!(matches!(
        build("CC1", sheet),
        Err(MeasurementError::Validation { .. })
    ));
}

#[test]
fn test_blank_sheet_name_and_no_site_cell_is_validation_error() {
    let sheet = GaugingSheet::new()
        .date_text("2024-01-01")
        .points(&STANDARD_POINTS);
    assert!(matches!(
        build("   ", sheet),
        Err(MeasurementError::Validation { .. })
    ));
}
