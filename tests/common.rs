// Shared fixtures for integration tests: gauging sheets laid out the way
// field crews fill them in (metadata block on rows 1-12, flow table from row 13).

#![allow(dead_code)]

use calamine::{Data, Range};
use chrono::NaiveDate;
use stream_gauge_service::measurement::model::FLOW_COLUMNS;

pub const HEADER_ROW: u32 = 12;

/// Cross-section with three samples: 3.0 cfs over 2.0 sq ft, max depth 1.0
pub const STANDARD_POINTS: [[f64; 6]; 3] = [
    [0.0, 1.0, 0.5, 1.0, 0.5, 0.5],
    [1.0, 1.0, 1.0, 2.0, 1.0, 2.0],
    [2.0, 1.0, 0.5, 1.0, 0.5, 0.5],
];

/// Builder for one gauging sheet's used range
pub struct GaugingSheet {
    range: Range<Data>,
    next_row: u32,
}

impl GaugingSheet {
    /// Sheet with flow headers in place and nothing else
    pub fn new() -> Self {
        let mut range = Range::new((0, 0), (HEADER_ROW, 13));
        for (col, header) in FLOW_COLUMNS.iter().enumerate() {
            range.set_value((HEADER_ROW, col as u32), Data::String(header.to_string()));
        }
        Self {
            range,
            next_row: HEADER_ROW + 1,
        }
    }

    /// Sheet with a site code, an ISO date string and the standard points
    pub fn standard(site: &str, date: &str) -> Self {
        Self::new()
            .site(site)
            .date_text(date)
            .points(&STANDARD_POINTS)
    }

    pub fn cell(mut self, row: u32, col: u32, value: Data) -> Self {
        self.range.set_value((row, col), value);
        self
    }

    pub fn site(self, code: &str) -> Self {
        self.cell(0, 13, Data::String(code.to_string()))
    }

    pub fn date_text(self, date: &str) -> Self {
        self.cell(2, 2, Data::String(date.to_string()))
    }

    pub fn crew(self, names: &str) -> Self {
        self.cell(4, 1, Data::String(names.to_string()))
    }

    pub fn point(mut self, values: [f64; 6]) -> Self {
        let row = self.next_row;
        for (col, value) in values.iter().enumerate() {
            self.range.set_value((row, col as u32), Data::Float(*value));
        }
        self.next_row += 1;
        self
    }

    pub fn points(self, rows: &[[f64; 6]]) -> Self {
        rows.iter().fold(self, |sheet, row| sheet.point(*row))
    }

    /// Standard cross-section with the middle sample carrying `total_cfs - 1.0`
    pub fn with_discharge(self, total_cfs: f64) -> Self {
        let middle = total_cfs - 1.0;
        self.points(&[
            STANDARD_POINTS[0],
            [1.0, 1.0, 1.0, middle, 1.0, middle],
            STANDARD_POINTS[2],
        ])
    }

    pub fn build(self) -> Range<Data> {
        self.range
    }
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
