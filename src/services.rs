pub mod ingest_service;
pub mod measurement_service;
pub mod profile_service;
pub mod statistics_service;
pub mod telemetry_service;

pub use ingest_service::{IngestError, IngestReport, SheetFailure};
pub use measurement_service::{MeasurementService, Selection};
pub use profile_service::{CrossSectionProfile, ProfileVariable};
pub use statistics_service::{StatisticsRow, StatisticsTable, Trend};
pub use telemetry_service::TelemetryService;
