use calamine::{Data, Range};
use tracing::{debug, info};

use crate::importers::workbook::WorkbookSource;
use crate::measurement::MeasurementError;

/// Reserved name of the workbook's roll-up sheet
pub const SUMMARY_SHEET: &str = "Summary";

/// Crews append this to a sheet name to mark it as erroneous
pub const INVALID_SHEET_MARKER: char = '!';

/// Rows 1-12 hold positional metadata
pub const METADATA_ROWS: u32 = 12;

/// Row 13 (index 12) holds the flow data headers, samples follow
pub const FLOW_HEADER_ROW: u32 = 12;

/// Flow data lives in columns A-F
pub const FLOW_COLUMN_COUNT: u32 = 6;

/// Positional metadata block: the first 12 rows of a sheet, every column, no header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataBlock {
    cells: Vec<Vec<Data>>,
}

impl MetadataBlock {
    pub fn from_rows(cells: Vec<Vec<Data>>) -> Self {
        Self { cells }
    }

    /// Cell at absolute (row, col). Out of range reads as `None`.
    pub fn get(&self, row: usize, col: usize) -> Option<&Data> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// Flow data block: header row plus sample rows from columns A-F.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowTable {
    headers: Vec<String>,
    rows: Vec<Vec<Data>>,
}

impl FlowTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Data>] {
        &self.rows
    }

    /// Position of the column whose header matches `name` exactly
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The two tables cut out of one gauging sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTables {
    pub name: String,
    pub flow: FlowTable,
    pub metadata: MetadataBlock,
}

/// Whether a sheet holds a site visit.
///
/// The `Summary` sheet and any sheet whose name contains `!` are excluded.
pub fn is_measurement_sheet(name: &str) -> bool {
    name != SUMMARY_SHEET && !name.contains(INVALID_SHEET_MARKER)
}

/// Split a sheet's used range into its metadata block and flow table
///
/// # Expected Sheet Structure:
/// ```text
/// Row 1-12:  Metadata, addressed by absolute cell (station, date, crew, ...)
/// Row 13:    Flow headers in A-F ("Dist. From initial point", "Width", "Depth", "V", ...)
/// Row 14+:   One cross-section sample per row
/// ```
///
/// Empty sheets produce empty tables; nothing is validated here.
pub fn split_sheet(name: &str, range: &Range<Data>) -> SheetTables {
    let (last_row, last_col) = match range.end() {
        Some(end) if !range.is_empty() => end,
        _ => {
            debug!("Sheet '{}' is empty", name);
            return SheetTables {
                name: name.to_string(),
                flow: FlowTable::default(),
                metadata: MetadataBlock::default(),
            };
        }
    };

    let cell = |row: u32, col: u32| -> Data {
        range.get_value((row, col)).cloned().unwrap_or(Data::Empty)
    };

    let metadata = MetadataBlock::from_rows(
        (0..METADATA_ROWS)
            .map(|row| (0..=last_col).map(|col| cell(row, col)).collect())
            .collect(),
    );

    let headers: Vec<String> = (0..FLOW_COLUMN_COUNT)
        .map(|col| match cell(FLOW_HEADER_ROW, col) {
            Data::Empty => String::new(),
            other => other.to_string().trim().to_string(),
        })
        .collect();

    let mut rows = Vec::new();
    for row in (FLOW_HEADER_ROW + 1)..=last_row {
        let values: Vec<Data> = (0..FLOW_COLUMN_COUNT).map(|col| cell(row, col)).collect();
        if values.iter().all(|v| matches!(v, Data::Empty)) {
            continue;
        }
        rows.push(values);
    }

    debug!(
        "Split sheet '{}': {} flow rows, metadata width {}",
        name,
        rows.len(),
        metadata.width()
    );

    SheetTables {
        name: name.to_string(),
        flow: FlowTable::new(headers, rows),
        metadata,
    }
}

/// Split every site-visit sheet of a workbook into its tables
///
/// Excluded sheets are skipped silently. A sheet that cannot be read yields
/// an error for that sheet only.
pub fn parse_tables<W: WorkbookSource + ?Sized>(
    workbook: &mut W,
) -> Vec<(String, Result<SheetTables, MeasurementError>)> {
    let sheet_names = workbook.sheet_names();
    debug!("Found {} total sheets", sheet_names.len());

    let mut parsed = Vec::new();
    for name in sheet_names {
        if !is_measurement_sheet(&name) {
            debug!("Skipping sheet '{}' (summary or flagged invalid)", name);
            continue;
        }

        let tables = workbook
            .sheet_range(&name)
            .map(|range| split_sheet(&name, &range))
            .map_err(|msg| MeasurementError::SheetRead {
                sheet: name.clone(),
                msg,
            });
        parsed.push((name, tables));
    }

    info!("Split {} site-visit sheets", parsed.len());
    parsed
}
