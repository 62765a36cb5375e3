use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, instrument};

use crate::importers::WorkbookDownloader;
use crate::services::ingest_service::{ingest_workbook_bytes, IngestReport};
use crate::services::MeasurementService;

/// Re-ingest the workbook on a fixed interval, starting immediately
#[instrument(skip(downloader, measurement_service), fields(interval_minutes = %interval_minutes))]
pub async fn start_refresh_scheduler(
    downloader: WorkbookDownloader,
    measurement_service: MeasurementService,
    interval_minutes: u64,
) {
    let mut interval = time::interval(Duration::from_secs(interval_minutes.max(1) * 60));

    info!("Refresh scheduler started with {} minute interval", interval_minutes);

    loop {
        interval.tick().await;
        debug!("Scheduler tick - refreshing measurements");

        match refresh(&downloader).await {
            Ok(report) => {
                info!(
                    "Refreshed {} measurements across {} sites ({} sheets skipped)",
                    report.measurements.len(),
                    report.sites.len(),
                    report.failures.len()
                );
                measurement_service.replace(report).await;
            }
            Err(e) => {
                error!("Failed to refresh measurements, keeping previous batch: {}", e);
            }
        }
    }
}

/// Download the workbook and ingest it on a blocking thread
#[instrument(skip(downloader))]
pub async fn refresh(
    downloader: &WorkbookDownloader,
) -> Result<IngestReport, Box<dyn std::error::Error + Send + Sync>> {
    let bytes = downloader.download().await?;
    let label = downloader.url().to_string();

    let report =
        tokio::task::spawn_blocking(move || ingest_workbook_bytes(&label, bytes)).await??;
    Ok(report)
}
