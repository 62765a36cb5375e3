/// Metadata schema for gauging sheets
///
/// Field locations are data, not code: each entry names a field, the cell the
/// crew normally writes it in, and optionally a second cell some crews use
/// instead. Resolution walks this list uniformly.
use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::importers::sheet_parser::MetadataBlock;

/// Absolute (row, col) cell address inside the metadata block, 0-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Metadata fields read from the top of every sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    Station,
    Coordinates,
    SiteCode,
    Date,
    StartTime,
    EndTime,
    Timezone,
    MeterType,
    Crew,
}

impl MetaField {
    pub fn name(&self) -> &'static str {
        match self {
            MetaField::Station => "station",
            MetaField::Coordinates => "coordinates",
            MetaField::SiteCode => "site_code",
            MetaField::Date => "date",
            MetaField::StartTime => "start_time",
            MetaField::EndTime => "end_time",
            MetaField::Timezone => "timezone",
            MetaField::MeterType => "meter_type",
            MetaField::Crew => "crew",
        }
    }
}

/// Where one field lives, with an optional alternate cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLocation {
    pub field: MetaField,
    pub primary: CellAddress,
    pub fallback: Option<CellAddress>,
}

impl FieldLocation {
    const fn at(field: MetaField, row: usize, col: usize) -> Self {
        Self {
            field,
            primary: CellAddress::new(row, col),
            fallback: None,
        }
    }

    const fn with_fallback(self, row: usize, col: usize) -> Self {
        Self {
            fallback: Some(CellAddress::new(row, col)),
            ..self
        }
    }

    /// Read the primary cell, falling back to the alternate when the primary is blank
    pub fn resolve(&self, block: &MetadataBlock) -> Option<Data> {
        read_cell(block, self.primary).or_else(|| {
            self.fallback
                .and_then(|fallback| read_cell(block, fallback))
        })
    }
}

/// Cell locations shared by every gauging sheet
pub const METADATA_SCHEMA: [FieldLocation; 9] = [
    FieldLocation::at(MetaField::Station, 0, 3),
    FieldLocation::at(MetaField::Coordinates, 0, 6),
    FieldLocation::at(MetaField::SiteCode, 0, 13),
    FieldLocation::at(MetaField::Date, 2, 2),
    FieldLocation::at(MetaField::StartTime, 2, 4),
    FieldLocation::at(MetaField::EndTime, 3, 4),
    FieldLocation::at(MetaField::Timezone, 2, 5),
    FieldLocation::at(MetaField::MeterType, 2, 13),
    FieldLocation::at(MetaField::Crew, 4, 1).with_fallback(4, 2),
];

/// Non-blank cell content at an address
fn read_cell(block: &MetadataBlock, address: CellAddress) -> Option<Data> {
    block
        .get(address.row, address.col)
        .filter(|data| !is_blank(data))
        .cloned()
}

/// Empty cells, whitespace-only strings and Excel error values all count as blank
pub fn is_blank(data: &Data) -> bool {
    match data {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Render a metadata cell as text
pub fn cell_text(data: &Data) -> Option<String> {
    match data {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{f:.0}")),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt.as_datetime().map(format_excel_datetime),
        Data::Empty | Data::Error(_) => None,
    }
}

/// Time-only cells sit on Excel's epoch day; show those as a clock time
fn format_excel_datetime(dt: NaiveDateTime) -> String {
    if dt.date() <= NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or(NaiveDate::MIN) {
        dt.format("%H:%M:%S").to_string()
    } else if dt.time() == chrono::NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Read a cell as a calendar date.
///
/// Accepts Excel dates, Excel serial numbers, ISO date-times and the
/// handwritten formats crews commonly type (`2024-01-15`, `1/15/2024`, ...).
pub fn cell_date(data: &Data) -> Option<NaiveDate> {
    match data {
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()),
        Data::Float(f) => excel_serial_to_date(*f),
        Data::Int(i) => excel_serial_to_date(*i as f64),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_text(s),
        _ => None,
    }
}

/// Read a cell as a number. Text is accepted when it parses cleanly.
pub fn cell_number(data: &Data) -> Option<f64> {
    match data {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m/%d/%y", "%m-%d-%Y"];

fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Convert Excel date serial to NaiveDate
///
/// Excel stores dates as day counts from 1899-12-30 (adjusted for Excel's
/// off-by-one leap year bug). Fractional days are time of day and are dropped.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    Duration::try_days(serial as i64).and_then(|days| epoch.checked_add_signed(days))
}
