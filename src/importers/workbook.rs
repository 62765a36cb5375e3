use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Anything that can hand out sheets by name.
///
/// Implemented for calamine's format-detecting [`Sheets`] and for
/// [`InMemoryWorkbook`], so parsing never depends on where a workbook came from.
pub trait WorkbookSource {
    /// Sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Full used range of a sheet, addressed by absolute (row, col)
    fn sheet_range(&mut self, name: &str) -> Result<Range<Data>, String>;
}

impl<RS: Read + Seek> WorkbookSource for Sheets<RS> {
    fn sheet_names(&self) -> Vec<String> {
        Reader::sheet_names(self)
    }

    fn sheet_range(&mut self, name: &str) -> Result<Range<Data>, String> {
        self.worksheet_range(name).map_err(|e| e.to_string())
    }
}

/// Open a workbook file from disk (synchronous, caller should use spawn_blocking)
pub fn open_workbook_file(
    path: impl AsRef<Path>,
) -> Result<Sheets<BufReader<File>>, calamine::Error> {
    open_workbook_auto(path)
}

/// Open a workbook from downloaded bytes without touching the filesystem
pub fn open_workbook_bytes(bytes: Vec<u8>) -> Result<Sheets<Cursor<Vec<u8>>>, calamine::Error> {
    open_workbook_auto_from_rs(Cursor::new(bytes))
}

/// Workbook held entirely in memory as named calamine ranges
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkbook {
    sheets: Vec<(String, Range<Data>)>,
}

impl InMemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet, keeping insertion order
    pub fn with_sheet(mut self, name: impl Into<String>, range: Range<Data>) -> Self {
        self.sheets.push((name.into(), range));
        self
    }
}

impl WorkbookSource for InMemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn sheet_range(&mut self, name: &str) -> Result<Range<Data>, String> {
        self.sheets
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(_, range)| range.clone())
            .ok_or_else(|| format!("Sheet not found: {name}"))
    }
}
