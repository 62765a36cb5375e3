use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::importers::WorkbookDownloader;
use crate::scheduler;
use crate::services::{MeasurementService, TelemetryService};
use crate::telemetry::{TelemetryFetcher, Threshold, ThresholdCatalog};

/// Application with all spawned background tasks and server
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub refresh_scheduler_handle: JoinHandle<()>,
}

impl Application {
    /// Build and initialize the application
    ///
    /// This creates the services and spawns:
    /// - HTTP API server (Axum)
    /// - Workbook refresh scheduler (first ingest runs immediately)
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let thresholds = load_thresholds(&config);
        info!("Loaded {} telemetry thresholds", thresholds.len());

        // Starts empty; the scheduler's first tick fills it
        let measurement_service = MeasurementService::default();
        let telemetry_fetcher =
            TelemetryFetcher::new(config.telemetry_url.clone(), config.telemetry_device());
        let telemetry_service = TelemetryService::new(telemetry_fetcher, thresholds);

        let downloader = WorkbookDownloader::new(config.workbook_url.clone());

        let refresh_scheduler_handle = {
            let measurement_service_clone = measurement_service.clone();
            let interval = config.refresh_interval_minutes;

            tokio::spawn(async move {
                scheduler::start_refresh_scheduler(downloader, measurement_service_clone, interval)
                    .await;
            })
        };

        let app_state = AppState {
            measurement_service,
            telemetry_service,
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            refresh_scheduler_handle,
        })
    }

    /// Run until the server stops (which runs indefinitely unless error)
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}

/// Thresholds for the configured telemetry site; missing or unreadable files yield none
fn load_thresholds(config: &Config) -> Vec<Threshold> {
    let Some(path) = config.thresholds_path.as_ref() else {
        return Vec::new();
    };

    match ThresholdCatalog::load(path) {
        Ok(catalog) => catalog.for_site(&config.telemetry_site_id),
        Err(e) => {
            warn!("Could not load thresholds from {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
