/// Rebase raw sensor readings on the channel bottom and compute
/// current-level comparisons for the query window.
use chrono::{Duration, Months, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::telemetry::fetcher::RawReading;
use crate::telemetry::thresholds::Threshold;

/// Query window, local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TelemetryWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TelemetryWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}

/// A reading expressed as depth above the channel bottom
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthReading {
    pub timestamp: NaiveDateTime,
    pub depth_ft: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySeries {
    pub window: TelemetryWindow,
    /// Oldest first
    pub readings: Vec<DepthReading>,
    /// Thresholds rebased the same way as the readings
    pub thresholds: Vec<Threshold>,
    pub channel_bottom_offset_ft: f64,
    /// Latest reading as a percentage of the window's mean
    pub percent_of_period_average: Option<f64>,
    /// Latest reading as a percentage of the level one month before the window end
    pub percent_of_month_ago: Option<f64>,
    /// Latest reading as a percentage of the level one year before the window end
    pub percent_of_year_ago: Option<f64>,
}

impl TelemetrySeries {
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn latest(&self) -> Option<&DepthReading> {
        self.readings.last()
    }
}

/// Lowest channel-bottom threshold value, or 0 when the site has none
pub fn channel_bottom_offset(thresholds: &[Threshold]) -> f64 {
    thresholds
        .iter()
        .filter(|t| t.is_channel_bottom())
        .map(|t| t.value)
        .reduce(f64::min)
        .unwrap_or(0.0)
}

/// Rebase readings and thresholds on the channel bottom
///
/// The percentage comparisons are only computed when a channel bottom was
/// found; the month and year comparisons also need a window of at least
/// 31 and 366 days respectively.
pub fn normalize(
    raw: &[RawReading],
    thresholds: &[Threshold],
    window: TelemetryWindow,
) -> TelemetrySeries {
    let offset = channel_bottom_offset(thresholds);

    let mut readings: Vec<DepthReading> = raw
        .iter()
        .map(|r| DepthReading {
            timestamp: r.timestamp,
            depth_ft: r.value - offset,
        })
        .collect();
    readings.sort_by_key(|r| r.timestamp);

    let thresholds = thresholds
        .iter()
        .map(|t| Threshold {
            value: t.value - offset,
            ..t.clone()
        })
        .collect();

    let mut series = TelemetrySeries {
        window,
        readings,
        thresholds,
        channel_bottom_offset_ft: offset,
        percent_of_period_average: None,
        percent_of_month_ago: None,
        percent_of_year_ago: None,
    };

    let latest = match series.latest() {
        Some(latest) if offset != 0.0 => latest.depth_ft,
        _ => {
            debug!(
                "No comparisons: {} readings, channel bottom offset {}",
                series.readings.len(),
                offset
            );
            return series;
        }
    };

    let mean = series.readings.iter().map(|r| r.depth_ft).sum::<f64>()
        / series.readings.len() as f64;
    series.percent_of_period_average = percent(latest, mean);

    if window.span() >= Duration::days(31) {
        series.percent_of_month_ago = window
            .end
            .checked_sub_months(Months::new(1))
            .and_then(|target| closest_reading(&series.readings, target))
            .and_then(|past| percent(latest, past.depth_ft));
    }
    if window.span() >= Duration::days(366) {
        series.percent_of_year_ago = window
            .end
            .checked_sub_months(Months::new(12))
            .and_then(|target| closest_reading(&series.readings, target))
            .and_then(|past| percent(latest, past.depth_ft));
    }

    series
}

fn percent(value: f64, reference: f64) -> Option<f64> {
    (reference != 0.0).then(|| 100.0 * value / reference)
}

/// Reading nearest to `target` in a timestamp-sorted slice
fn closest_reading(readings: &[DepthReading], target: NaiveDateTime) -> Option<&DepthReading> {
    let idx = readings.partition_point(|r| r.timestamp < target);
    let before = idx.checked_sub(1).and_then(|i| readings.get(i));
    let after = readings.get(idx);

    match (before, after) {
        (Some(b), Some(a)) => {
            if target - b.timestamp <= a.timestamp - target {
                Some(b)
            } else {
                Some(a)
            }
        }
        (Some(b), None) => Some(b),
        (None, a) => a,
    }
}
