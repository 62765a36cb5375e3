use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::importers::sheet_parser::parse_tables;
use crate::importers::workbook::{open_workbook_bytes, open_workbook_file, WorkbookSource};
use crate::measurement::{build_from_tables, Measurement, MeasurementError};
use crate::utils::{date_label, is_spreadsheet_path};

/// Workbook or folder level failures. Sheet level failures never surface here.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to open workbook {path}: {msg}")]
    WorkbookOpen { path: String, msg: String },

    #[error("Failed to read folder {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A sheet excluded from the batch, and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetFailure {
    pub workbook: String,
    pub sheet: String,
    pub kind: &'static str,
    pub message: String,
}

impl SheetFailure {
    fn new(workbook: &str, sheet: &str, error: &MeasurementError) -> Self {
        Self {
            workbook: workbook.to_string(),
            sheet: sheet.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Result of one ingestion pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub measurements: Vec<Measurement>,
    pub failures: Vec<SheetFailure>,
    /// Distinct observation dates, ascending
    pub dates: Vec<NaiveDate>,
    /// Distinct site codes, ascending
    pub sites: Vec<String>,
}

impl IngestReport {
    /// Assemble a report, deriving the distinct date and site lists
    pub fn from_outcomes(measurements: Vec<Measurement>, failures: Vec<SheetFailure>) -> Self {
        let dates: BTreeSet<NaiveDate> = measurements.iter().map(|m| m.date).collect();
        let sites: BTreeSet<String> = measurements.iter().map(|m| m.site_code.clone()).collect();

        Self {
            measurements,
            failures,
            dates: dates.into_iter().collect(),
            sites: sites.into_iter().collect(),
        }
    }

    /// Combine reports from several workbooks, in the order given
    pub fn merge(reports: impl IntoIterator<Item = IngestReport>) -> Self {
        let mut measurements = Vec::new();
        let mut failures = Vec::new();
        for report in reports {
            measurements.extend(report.measurements);
            failures.extend(report.failures);
        }
        Self::from_outcomes(measurements, failures)
    }

    /// Dates formatted `YYYY/MM/DD`, ascending
    pub fn date_labels(&self) -> Vec<String> {
        self.dates.iter().map(|d| date_label(*d)).collect()
    }
}

/// Parse and build every site-visit sheet of one workbook
///
/// Each sheet succeeds or fails on its own; failures are logged with the
/// sheet name and collected, never propagated.
#[instrument(skip(workbook), fields(workbook = %label))]
pub fn ingest_workbook<W: WorkbookSource + ?Sized>(label: &str, workbook: &mut W) -> IngestReport {
    let mut measurements = Vec::new();
    let mut failures = Vec::new();

    for (sheet, tables) in parse_tables(workbook) {
        match tables.and_then(|t| build_from_tables(&t)) {
            Ok(measurement) => {
                debug!(
                    "✓ Sheet '{}': site {} on {}",
                    sheet, measurement.site_code, measurement.date
                );
                measurements.push(measurement);
            }
            Err(e) => {
                warn!("Skipping sheet '{}' in {}: {}", sheet, label, e);
                failures.push(SheetFailure::new(label, &sheet, &e));
            }
        }
    }

    info!(
        "Ingested {} measurements from {} ({} sheets skipped)",
        measurements.len(),
        label,
        failures.len()
    );
    IngestReport::from_outcomes(measurements, failures)
}

/// Open and ingest a workbook file (synchronous, caller should use spawn_blocking)
pub fn ingest_workbook_file(path: impl AsRef<Path>) -> Result<IngestReport, IngestError> {
    let path = path.as_ref();
    let label = path.display().to_string();
    let mut workbook = open_workbook_file(path).map_err(|e| IngestError::WorkbookOpen {
        path: label.clone(),
        msg: e.to_string(),
    })?;
    Ok(ingest_workbook(&label, &mut workbook))
}

/// Ingest a workbook held in memory, e.g. freshly downloaded
pub fn ingest_workbook_bytes(label: &str, bytes: Vec<u8>) -> Result<IngestReport, IngestError> {
    let mut workbook = open_workbook_bytes(bytes).map_err(|e| IngestError::WorkbookOpen {
        path: label.to_string(),
        msg: e.to_string(),
    })?;
    Ok(ingest_workbook(label, &mut workbook))
}

/// Spreadsheet files directly inside `dir`, sorted by path. Other files are ignored.
pub fn spreadsheet_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, IngestError> {
    let dir = dir.as_ref();
    let io_err = |source| IngestError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_spreadsheet_path(&path) {
            files.push(path);
        } else {
            debug!("Ignoring non-spreadsheet entry {}", path.display());
        }
    }

    files.sort();
    Ok(files)
}

/// Ingest every spreadsheet in a folder
///
/// A workbook that cannot be opened is logged and skipped like a bad sheet.
#[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
pub fn ingest_folder(dir: impl AsRef<Path>) -> Result<IngestReport, IngestError> {
    let files = spreadsheet_files(&dir)?;
    info!("Found {} workbooks", files.len());

    let reports = files.iter().filter_map(|path| match ingest_workbook_file(path) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("Skipping workbook: {}", e);
            None
        }
    });

    Ok(IngestReport::merge(reports))
}
