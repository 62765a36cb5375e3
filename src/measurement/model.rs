use chrono::NaiveDate;
use serde::Serialize;

use crate::measurement::error::MeasurementError;
use crate::utils::date_label;

/// Flow data column headers, exactly as they appear on row 13 of a gauging sheet
pub const DISTANCE_COLUMN: &str = "Dist. From initial point";
pub const WIDTH_COLUMN: &str = "Width";
pub const DEPTH_COLUMN: &str = "Depth";
pub const VELOCITY_COLUMN: &str = "V";
pub const AREA_COLUMN: &str = "Area, ft2";
pub const DISCHARGE_COLUMN: &str = "Dis-charge, ft3/s";

/// All flow data columns, in sheet order (A-F)
pub const FLOW_COLUMNS: [&str; 6] = [
    DISTANCE_COLUMN,
    WIDTH_COLUMN,
    DEPTH_COLUMN,
    VELOCITY_COLUMN,
    AREA_COLUMN,
    DISCHARGE_COLUMN,
];

/// One sampled point along the cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowPoint {
    pub distance_ft: f64,
    pub width_ft: f64,
    pub depth_ft: f64,
    pub velocity_fps: f64,
    pub area_sqft: f64,
    pub discharge_cfs: f64,
}

/// A flow point tagged with the site and date of the measurement it belongs to,
/// so consumers can group or filter samples without going back to the parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSample {
    #[serde(flatten)]
    pub point: FlowPoint,
    pub site_code: String,
    /// Observation date as `YYYY/MM/DD`
    pub date_label: String,
}

/// Totals derived from the flow points of one sheet
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowSummary {
    pub discharge_cfs: f64,
    pub area_sqft: f64,
    pub average_velocity_fps: f64,
    pub max_observed_depth_ft: f64,
}

impl FlowSummary {
    /// Sum discharge and area, then derive average velocity and max depth.
    ///
    /// Zero total area (including an empty cross-section) is a `Division` error.
    pub fn from_points(sheet_name: &str, points: &[FlowPoint]) -> Result<Self, MeasurementError> {
        let discharge_cfs: f64 = points.iter().map(|p| p.discharge_cfs).sum();
        let area_sqft: f64 = points.iter().map(|p| p.area_sqft).sum();

        if area_sqft == 0.0 {
            return Err(MeasurementError::Division {
                sheet: sheet_name.to_string(),
            });
        }

        let max_observed_depth_ft = points
            .iter()
            .map(|p| p.depth_ft)
            .fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            discharge_cfs,
            area_sqft,
            average_velocity_fps: discharge_cfs / area_sqft,
            max_observed_depth_ft,
        })
    }
}

/// Descriptive fields from the metadata block. Each one is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasurementMetadata {
    pub station: Option<String>,
    pub coordinates: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub meter_type: Option<String>,
    pub crew: Vec<String>,
}

/// One field crew visit: a validated site code and date, the crew's metadata,
/// and the cross-section samples with their derived totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub sheet_name: String,
    pub site_code: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub metadata: MeasurementMetadata,
    pub flow_data: Vec<FlowSample>,
    pub discharge_cfs: f64,
    pub area_sqft: f64,
    pub average_velocity_fps: f64,
    pub max_observed_depth_ft: f64,
}

impl Measurement {
    /// Build a measurement from already-resolved fields and raw flow points.
    pub fn new(
        sheet_name: impl Into<String>,
        site_code: impl Into<String>,
        date: NaiveDate,
        metadata: MeasurementMetadata,
        points: Vec<FlowPoint>,
    ) -> Result<Self, MeasurementError> {
        let sheet_name = sheet_name.into();
        let site_code = site_code.into();

        if site_code.trim().is_empty() {
            return Err(MeasurementError::Validation {
                sheet: sheet_name,
                msg: "site code is empty".to_string(),
            });
        }

        let summary = FlowSummary::from_points(&sheet_name, &points)?;
        Ok(Self::assemble(
            sheet_name, site_code, date, metadata, points, summary,
        ))
    }

    /// Final assembly once every check has passed. Points are ordered by
    /// distance from the initial point and tagged with site and date.
    pub(crate) fn assemble(
        sheet_name: String,
        site_code: String,
        date: NaiveDate,
        metadata: MeasurementMetadata,
        mut points: Vec<FlowPoint>,
        summary: FlowSummary,
    ) -> Self {
        points.sort_by(|a, b| a.distance_ft.total_cmp(&b.distance_ft));

        let label = date_label(date);
        let flow_data = points
            .into_iter()
            .map(|point| FlowSample {
                point,
                site_code: site_code.clone(),
                date_label: label.clone(),
            })
            .collect();

        Self {
            sheet_name,
            site_code,
            date,
            metadata,
            flow_data,
            discharge_cfs: summary.discharge_cfs,
            area_sqft: summary.area_sqft,
            average_velocity_fps: summary.average_velocity_fps,
            max_observed_depth_ft: summary.max_observed_depth_ft,
        }
    }

    /// Observation date as `YYYY/MM/DD`
    pub fn date_label(&self) -> String {
        date_label(self.date)
    }

    /// Width-weighted mean depth over the cross-section span:
    /// `sum(depth * width) / (last distance - first distance)`.
    ///
    /// `None` when the samples span no distance.
    pub fn average_depth_ft(&self) -> Option<f64> {
        let first = self.flow_data.first()?.point.distance_ft;
        let last = self.flow_data.last()?.point.distance_ft;
        let span = last - first;
        if span <= 0.0 {
            return None;
        }

        let weighted: f64 = self
            .flow_data
            .iter()
            .map(|s| s.point.depth_ft * s.point.width_ft)
            .sum();
        Some(weighted / span)
    }
}
