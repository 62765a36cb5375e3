// Measurement module
//
// One field crew visit per sheet: the positional metadata at the top of the
// sheet, the cross-section flow table beneath it, and the totals derived from it.

pub mod builder;
pub mod error;
pub mod model;
pub mod schema;

pub use builder::{build, build_from_tables};
pub use error::MeasurementError;
pub use model::{FlowPoint, FlowSample, FlowSummary, Measurement, MeasurementMetadata};
