use tracing::{info, instrument, warn};

use crate::telemetry::{normalize, TelemetryFetcher, TelemetrySeries, TelemetryWindow, Threshold};

/// Fetches the telemetry feed and normalizes it for one configured sensor.
///
/// A failed fetch is not an error for callers: it yields an empty series,
/// the same as a window with no readings.
#[derive(Clone)]
pub struct TelemetryService {
    fetcher: TelemetryFetcher,
    thresholds: Vec<Threshold>,
}

impl TelemetryService {
    pub fn new(fetcher: TelemetryFetcher, thresholds: Vec<Threshold>) -> Self {
        Self {
            fetcher,
            thresholds,
        }
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn depth_series(&self, window: TelemetryWindow) -> TelemetrySeries {
        let raw = match self.fetcher.fetch_readings(window.start, window.end).await {
            Ok(readings) => readings,
            Err(e) => {
                warn!("Telemetry fetch failed, returning empty series: {}", e);
                Vec::new()
            }
        };

        let series = normalize(&raw, &self.thresholds, window);
        info!(
            "Telemetry series: {} readings, channel bottom offset {:.2} ft",
            series.readings.len(),
            series.channel_bottom_offset_ft
        );
        series
    }
}
