use thiserror::Error;

/// Failures while turning one sheet into a [`Measurement`](super::Measurement).
///
/// These never abort a batch: the ingestor logs them against the sheet name
/// and moves on to the next sheet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("Sheet '{sheet}' is missing flow data column '{column}'")]
    DataFormat { sheet: String, column: String },

    #[error("Sheet '{sheet}' failed validation: {msg}")]
    Validation { sheet: String, msg: String },

    #[error("Sheet '{sheet}' has zero cross-sectional area, cannot compute average velocity")]
    Division { sheet: String },

    #[error("Failed to read sheet '{sheet}': {msg}")]
    SheetRead { sheet: String, msg: String },
}

impl MeasurementError {
    /// Short label for the error kind, used in logs and ingest summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            MeasurementError::DataFormat { .. } => "data_format",
            MeasurementError::Validation { .. } => "validation",
            MeasurementError::Division { .. } => "division",
            MeasurementError::SheetRead { .. } => "sheet_read",
        }
    }
}
