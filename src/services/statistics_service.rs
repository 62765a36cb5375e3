/// Summary statistics and measurement-to-measurement deltas
///
/// Every measurement becomes one raw row. Within each location, rows are
/// ordered by date and each row after the first also produces a delta row:
/// the field-wise change from the previous visit, keyed on the later date.
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::measurement::Measurement;
use crate::utils::round_hundredths;

/// Column names of the statistics table, in display order
pub const STATISTICS_COLUMNS: [&str; 6] = [
    "Location",
    "Date",
    "Max Depth (ft)",
    "Avg Depth (ft)",
    "Total Discharge (CFS)",
    "Average Velocity (ft/s)",
];

/// Direction of change in a delta cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
    Unchanged,
}

impl Trend {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Trend::Increase
        } else if delta < 0.0 {
            Trend::Decrease
        } else {
            Trend::Unchanged
        }
    }
}

/// Trend of each measure on a delta row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeasureTrends {
    pub max_depth: Trend,
    pub avg_depth: Option<Trend>,
    pub total_discharge: Trend,
    pub average_velocity: Trend,
}

/// One row of the statistics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsRow {
    pub location: String,
    pub date: NaiveDate,
    pub max_depth_ft: f64,
    pub avg_depth_ft: Option<f64>,
    pub total_discharge_cfs: f64,
    pub average_velocity_fps: f64,
    /// Display hint: this row is the change since the previous visit
    pub is_delta: bool,
}

impl StatisticsRow {
    pub fn from_measurement(measurement: &Measurement) -> Self {
        Self {
            location: measurement.site_code.clone(),
            date: measurement.date,
            max_depth_ft: measurement.max_observed_depth_ft,
            avg_depth_ft: measurement.average_depth_ft(),
            total_discharge_cfs: measurement.discharge_cfs,
            average_velocity_fps: measurement.average_velocity_fps,
            is_delta: false,
        }
    }

    /// Change from `previous` to `self`, keyed on `self`
    fn delta_since(&self, previous: &StatisticsRow) -> StatisticsRow {
        StatisticsRow {
            location: self.location.clone(),
            date: self.date,
            max_depth_ft: self.max_depth_ft - previous.max_depth_ft,
            avg_depth_ft: match (self.avg_depth_ft, previous.avg_depth_ft) {
                (Some(current), Some(prior)) => Some(current - prior),
                _ => None,
            },
            total_discharge_cfs: self.total_discharge_cfs - previous.total_discharge_cfs,
            average_velocity_fps: self.average_velocity_fps - previous.average_velocity_fps,
            is_delta: true,
        }
    }

    fn rounded(self) -> StatisticsRow {
        StatisticsRow {
            max_depth_ft: round_hundredths(self.max_depth_ft),
            avg_depth_ft: self.avg_depth_ft.map(round_hundredths),
            total_discharge_cfs: round_hundredths(self.total_discharge_cfs),
            average_velocity_fps: round_hundredths(self.average_velocity_fps),
            ..self
        }
    }

    /// Trends of each measure, for delta rows only
    pub fn trends(&self) -> Option<MeasureTrends> {
        self.is_delta.then(|| MeasureTrends {
            max_depth: Trend::of(self.max_depth_ft),
            avg_depth: self.avg_depth_ft.map(Trend::of),
            total_discharge: Trend::of(self.total_discharge_cfs),
            average_velocity: Trend::of(self.average_velocity_fps),
        })
    }
}

/// Raw and delta rows for a set of measurements
///
/// Ordering: location descending, date ascending, and for the same location
/// and date the delta row first. All measures are rounded to two decimals
/// after differencing.
pub fn compute(measurements: &[Measurement]) -> Vec<StatisticsRow> {
    if measurements.is_empty() {
        return Vec::new();
    }

    let mut by_location: BTreeMap<&str, Vec<StatisticsRow>> = BTreeMap::new();
    for measurement in measurements {
        by_location
            .entry(measurement.site_code.as_str())
            .or_default()
            .push(StatisticsRow::from_measurement(measurement));
    }

    let mut rows = Vec::with_capacity(measurements.len() * 2);
    for (location, mut group) in by_location {
        group.sort_by_key(|row| row.date);
        debug!("Location {}: {} measurements", location, group.len());

        rows.extend(group.windows(2).map(|pair| pair[1].delta_since(&pair[0])));
        rows.extend(group);
    }

    rows.sort_by(|a, b| {
        b.location
            .cmp(&a.location)
            .then(a.date.cmp(&b.date))
            .then(b.is_delta.cmp(&a.is_delta))
    });

    rows.into_iter().map(StatisticsRow::rounded).collect()
}

/// Statistics rows paired with their column names, ready to serialize
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<StatisticsRow>,
}

impl StatisticsTable {
    pub fn from_measurements(measurements: &[Measurement]) -> Self {
        Self {
            columns: STATISTICS_COLUMNS.to_vec(),
            rows: compute(measurements),
        }
    }
}
