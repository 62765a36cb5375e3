use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Colour tag that marks a site's channel-bottom threshold
pub const CHANNEL_BOTTOM_COLOR: &str = "brown";

#[derive(Error, Debug)]
pub enum ThresholdError {
    #[error("Failed to read threshold file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid threshold definitions: {0}")]
    Json(#[from] serde_json::Error),
}

/// A named stage level for a site, in feet of raw sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub label: String,
    pub value: f64,
    pub color: String,
}

impl Threshold {
    pub fn is_channel_bottom(&self) -> bool {
        self.color.trim().eq_ignore_ascii_case(CHANNEL_BOTTOM_COLOR)
    }
}

/// Threshold definitions for every site, keyed by telemetry site id
///
/// File format:
/// ```json
/// { "29": [ { "label": "Channel Bottom", "value": 100.0, "color": "brown" } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThresholdCatalog(HashMap<String, Vec<Threshold>>);

impl ThresholdCatalog {
    pub fn from_json(json: &str) -> Result<Self, ThresholdError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ThresholdError> {
        let path = path.as_ref();
        let catalog = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(
            "Loaded thresholds for {} sites from {}",
            catalog.0.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Thresholds for a site in file order; empty when none are defined
    pub fn for_site(&self, site_id: &str) -> Vec<Threshold> {
        self.0.get(site_id).cloned().unwrap_or_default()
    }
}
