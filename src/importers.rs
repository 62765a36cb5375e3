//! Workbook importers: retrieval, sheet access, and per-sheet table splitting

pub mod downloader;
pub mod sheet_parser;
pub mod workbook;

// Re-export commonly used items
pub use downloader::{DownloadError, WorkbookDownloader};
pub use sheet_parser::{FlowTable, MetadataBlock, SheetTables};
pub use workbook::{InMemoryWorkbook, WorkbookSource};
