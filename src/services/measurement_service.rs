use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::measurement::Measurement;
use crate::services::ingest_service::IngestReport;
use crate::services::profile_service::{cross_section_profiles, CrossSectionProfile, ProfileVariable};
use crate::services::statistics_service::StatisticsTable;

/// Which measurements a query covers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Site code to match, or every site
    pub site: Option<String>,
    /// `YYYY/MM/DD` labels to match, or every date when empty
    pub dates: Vec<String>,
}

impl Selection {
    pub fn matches(&self, measurement: &Measurement) -> bool {
        let site_ok = self
            .site
            .as_deref()
            .map_or(true, |site| measurement.site_code == site);
        let date_ok =
            self.dates.is_empty() || self.dates.contains(&measurement.date_label());
        site_ok && date_ok
    }
}

/// Measurements matching a selection, in ingestion order
pub fn select(measurements: &[Measurement], selection: &Selection) -> Vec<Measurement> {
    measurements
        .iter()
        .filter(|m| selection.matches(m))
        .cloned()
        .collect()
}

/// Holds the most recent ingestion pass in memory and answers queries over it
#[derive(Clone, Default)]
pub struct MeasurementService {
    snapshot: Arc<RwLock<Arc<IngestReport>>>,
}

impl MeasurementService {
    pub fn new(report: IngestReport) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Arc::new(report))),
        }
    }

    /// Swap in a fresh batch
    #[instrument(skip(self, report), fields(measurements = report.measurements.len()))]
    pub async fn replace(&self, report: IngestReport) {
        let mut guard = self.snapshot.write().await;
        *guard = Arc::new(report);
        info!("Measurement snapshot replaced");
    }

    pub async fn snapshot(&self) -> Arc<IngestReport> {
        self.snapshot.read().await.clone()
    }

    pub async fn sites(&self) -> Vec<String> {
        self.snapshot().await.sites.clone()
    }

    pub async fn date_labels(&self) -> Vec<String> {
        self.snapshot().await.date_labels()
    }

    pub async fn measurements(&self, selection: &Selection) -> Vec<Measurement> {
        let snapshot = self.snapshot().await;
        let selected = select(&snapshot.measurements, selection);
        debug!(
            "Selected {} of {} measurements",
            selected.len(),
            snapshot.measurements.len()
        );
        selected
    }

    pub async fn statistics(&self, selection: &Selection) -> StatisticsTable {
        StatisticsTable::from_measurements(&self.measurements(selection).await)
    }

    pub async fn profiles(
        &self,
        selection: &Selection,
        variables: &[ProfileVariable],
    ) -> Vec<CrossSectionProfile> {
        cross_section_profiles(&self.measurements(selection).await, variables)
    }
}
