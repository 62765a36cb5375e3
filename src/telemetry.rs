// Telemetry module
//
// The county's stage sensor publishes raw depth readings as a CSV export.
// Readings are rebased on the site's channel-bottom threshold so that zero
// means water at the streambed.

pub mod fetcher;
pub mod normalizer;
pub mod thresholds;

pub use fetcher::{RawReading, TelemetryDevice, TelemetryFetcher};
pub use normalizer::{normalize, DepthReading, TelemetrySeries, TelemetryWindow};
pub use thresholds::{Threshold, ThresholdCatalog, ThresholdError};
