use std::env;
use std::path::PathBuf;

use crate::telemetry::TelemetryDevice;

pub const DEFAULT_TELEMETRY_URL: &str = "https://wr.slocountywater.org/export/file/";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub workbook_url: String,
    pub refresh_interval_minutes: u64,
    pub telemetry_url: String,
    pub telemetry_site_id: String,
    pub telemetry_site: String,
    pub telemetry_device_id: String,
    pub telemetry_device: String,
    pub telemetry_timezone: String,
    pub thresholds_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            workbook_url: env::var("WORKBOOK_URL")?,
            refresh_interval_minutes: env::var("REFRESH_INTERVAL_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            telemetry_url: env::var("TELEMETRY_URL")
                .unwrap_or_else(|_| DEFAULT_TELEMETRY_URL.to_string()),
            telemetry_site_id: env::var("TELEMETRY_SITE_ID").unwrap_or_else(|_| "29".to_string()),
            telemetry_site: env::var("TELEMETRY_SITE")
                .unwrap_or_else(|_| "5952eafd-17d9-4cb6-a6dd-c949a99525f0".to_string()),
            telemetry_device_id: env::var("TELEMETRY_DEVICE_ID")
                .unwrap_or_else(|_| "1".to_string()),
            telemetry_device: env::var("TELEMETRY_DEVICE")
                .unwrap_or_else(|_| "1c308219-4b72-4307-a5c0-76ed02cdba41".to_string()),
            telemetry_timezone: env::var("TELEMETRY_TIMEZONE")
                .unwrap_or_else(|_| "US/Pacific".to_string()),
            thresholds_path: env::var("THRESHOLDS_PATH").ok().map(PathBuf::from),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn telemetry_device(&self) -> TelemetryDevice {
        TelemetryDevice {
            site_id: self.telemetry_site_id.clone(),
            site: self.telemetry_site.clone(),
            device_id: self.telemetry_device_id.clone(),
            device: self.telemetry_device.clone(),
            timezone: self.telemetry_timezone.clone(),
        }
    }
}
