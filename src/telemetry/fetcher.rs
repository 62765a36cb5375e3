use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::fetch_error::FetchError;

/// Timestamp format of the `Reading` column, also used for query bounds
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const READING_COLUMN: &str = "Reading";
pub const VALUE_COLUMN: &str = "Value";

/// One raw sensor reading, in local time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawReading {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Identifies one sensor on the county export service
#[derive(Debug, Clone)]
pub struct TelemetryDevice {
    pub site_id: String,
    pub site: String,
    pub device_id: String,
    pub device: String,
    pub timezone: String,
}

#[derive(Clone)]
pub struct TelemetryFetcher {
    client: reqwest::Client,
    url: String,
    device: TelemetryDevice,
}

impl TelemetryFetcher {
    pub fn new(url: String, device: TelemetryDevice) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            url,
            device,
        }
    }

    pub fn device(&self) -> &TelemetryDevice {
        &self.device
    }

    fn query(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<(&'static str, String)> {
        vec![
            ("site_id", self.device.site_id.clone()),
            ("site", self.device.site.clone()),
            ("device_id", self.device.device_id.clone()),
            ("device", self.device.device.clone()),
            ("mode", String::new()),
            ("hours", String::new()),
            ("data_start", start.format(TIMESTAMP_FORMAT).to_string()),
            ("data_end", end.format(TIMESTAMP_FORMAT).to_string()),
            ("tz", self.device.timezone.clone()),
            ("format_datetime", "%Y-%m-%d %H:%i:%S".to_string()),
            ("mime", "txt".to_string()),
            ("delimiter", "comma".to_string()),
        ]
    }

    /// Fetch readings between `start` and `end` (local time), oldest first
    #[instrument(skip(self), fields(url = %self.url, site_id = %self.device.site_id))]
    pub async fn fetch_readings(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<RawReading>, FetchError> {
        debug!("Sending HTTP request to telemetry export");
        let response = self
            .client
            .get(&self.url)
            .query(&self.query(start, end))
            .send()
            .await?;

        let status = response.status();
        debug!("Received HTTP response with status: {}", status);
        if !status.is_success() {
            return Err(FetchError::RemoteStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        debug!("Retrieved CSV content, size: {} bytes", body.len());

        self.parse_csv(&body)
    }

    #[instrument(skip(self, body), fields(body_size = body.len()))]
    fn parse_csv(&self, body: &str) -> Result<Vec<RawReading>, FetchError> {
        if body.trim().is_empty() {
            debug!("Empty CSV body, no readings");
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let headers = reader.headers()?.clone();
        let reading_idx = headers
            .iter()
            .position(|h| h == READING_COLUMN)
            .ok_or(FetchError::MissingColumn(READING_COLUMN))?;
        let value_idx = headers
            .iter()
            .position(|h| h == VALUE_COLUMN)
            .ok_or(FetchError::MissingColumn(VALUE_COLUMN))?;

        let mut readings = Vec::new();
        let mut skipped_rows = 0;
        let mut row_count = 0;

        for record in reader.records() {
            let record = record?;
            row_count += 1;

            let timestamp_str = record.get(reading_idx).unwrap_or_default();
            let value_str = record.get(value_idx).unwrap_or_default();

            match self.parse_reading(timestamp_str, value_str) {
                Ok(reading) => readings.push(reading),
                Err(e) => {
                    warn!(
                        "Failed to parse row {}: {} (reading='{}', value='{}')",
                        row_count, e, timestamp_str, value_str
                    );
                    skipped_rows += 1;
                }
            }
        }

        if skipped_rows > 0 {
            warn!("Skipped {} unparseable rows out of {}", skipped_rows, row_count);
        }
        debug!("Successfully parsed {} readings from {} rows", readings.len(), row_count);

        readings.sort_by_key(|r| r.timestamp);
        Ok(readings)
    }

    fn parse_reading(&self, timestamp_str: &str, value_str: &str) -> Result<RawReading, FetchError> {
        let timestamp = NaiveDateTime::parse_from_str(timestamp_str, TIMESTAMP_FORMAT)
            .map_err(|e| FetchError::DateTimeError(e.to_string()))?;

        let value = value_str
            .parse::<f64>()
            .map_err(|e| FetchError::NumberError(e.to_string()))?;

        Ok(RawReading { timestamp, value })
    }
}
