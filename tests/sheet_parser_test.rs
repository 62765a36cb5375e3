// Tests for splitting workbook sheets into metadata blocks and flow tables

mod common;

use calamine::{Data, Range};
use common::GaugingSheet;
use stream_gauge_service::importers::sheet_parser::{parse_tables, split_sheet};
use stream_gauge_service::importers::InMemoryWorkbook;
use stream_gauge_service::measurement::model::FLOW_COLUMNS;
use stream_gauge_service::measurement::MeasurementError;

#[test]
fn test_split_standard_sheet() {
    let range = GaugingSheet::standard("CC1", "2024-01-15").build();
    let tables = split_sheet("CC1 2024-01-15", &range);

    assert_eq!(tables.name, "CC1 2024-01-15");
    assert_eq!(tables.flow.headers(), FLOW_COLUMNS.map(String::from).as_slice());
    assert_eq!(tables.flow.rows().len(), 3);
    assert_eq!(tables.metadata.height(), 12);
    assert_eq!(
        tables.metadata.get(0, 13),
        Some(&Data::String("CC1".to_string()))
    );
}

#[test]
fn test_split_skips_blank_rows_between_points() {
    let range = GaugingSheet::new()
        .point([0.0, 1.0, 1.0, 1.0, 1.0, 1.0])
        .cell(20, 0, Data::Float(5.0))
        .build();
    let tables = split_sheet("gap", &range);

    // rows 14..=19 are empty and dropped; row 20 is partial but kept
    assert_eq!(tables.flow.rows().len(), 2);
    assert_eq!(tables.flow.rows()[1][0], Data::Float(5.0));
    assert_eq!(tables.flow.rows()[1][1], Data::Empty);
}

#[test]
fn test_split_range_not_starting_at_origin() {
    // Used range begins on row 3: metadata rows above it read as blank
    let mut range = Range::new((2, 0), (13, 13));
    range.set_value((2, 2), Data::String("2024-03-01".to_string()));
    for (col, header) in FLOW_COLUMNS.iter().enumerate() {
        range.set_value((12, col as u32), Data::String(header.to_string()));
    }
    for col in 0..6 {
        range.set_value((13, col), Data::Float(1.0));
    }

    let tables = split_sheet("SLO3 visit", &range);
    assert_eq!(tables.metadata.get(0, 3), Some(&Data::Empty));
    assert_eq!(
        tables.metadata.get(2, 2),
        Some(&Data::String("2024-03-01".to_string()))
    );
    assert_eq!(tables.flow.rows().len(), 1);
}

#[test]
fn test_split_empty_sheet() {
    let range: Range<Data> = Range::empty();
    let tables = split_sheet("blank", &range);
    assert!(tables.flow.is_empty());
    assert_eq!(tables.metadata.height(), 0);
}

#[test]
fn test_parse_tables_excludes_summary_and_flagged_sheets() {
    let mut workbook = InMemoryWorkbook::new()
        .with_sheet("SiteA 2024-01-01", GaugingSheet::standard("SiteA", "2024-01-01").build())
        .with_sheet("Summary", GaugingSheet::new().build())
        .with_sheet("SiteA 2024-02-01!bad", GaugingSheet::standard("SiteA", "2024-02-01").build());

    let parsed = parse_tables(&mut workbook);
    let names: Vec<&str> = parsed.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["SiteA 2024-01-01"]);
    assert!(parsed[0].1.is_ok());
}

#[test]
fn test_parse_tables_keeps_workbook_order() {
    let mut workbook = InMemoryWorkbook::new()
        .with_sheet("B 2024-01-02", GaugingSheet::standard("B", "2024-01-02").build())
        .with_sheet("A 2024-01-01", GaugingSheet::standard("A", "2024-01-01").build());

    let names: Vec<String> = parse_tables(&mut workbook)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["B 2024-01-02", "A 2024-01-01"]);
}

#[test]
fn test_sheet_read_error_is_per_sheet() {
    struct FlakyWorkbook;

    impl stream_gauge_service::importers::WorkbookSource for FlakyWorkbook {
        fn sheet_names(&self) -> Vec<String> {
            vec!["good".to_string(), "broken".to_string()]
        }

        fn sheet_range(&mut self, name: &str) -> Result<Range<Data>, String> {
            match name {
                "good" => Ok(GaugingSheet::standard("G", "2024-01-01").build()),
                _ => Err("corrupt sheet xml".to_string()),
            }
        }
    }

    let parsed = parse_tables(&mut FlakyWorkbook);
    assert_eq!(parsed.len(), 2);
    assert!(parsed[0].1.is_ok());
    match &parsed[1].1 {
        Err(MeasurementError::SheetRead { sheet, msg }) => {
            assert_eq!(sheet, "broken");
            assert!(msg.contains("corrupt"));
        }
        other => panic!("Expected SheetRead error, got {other:?}"),
    }
}
