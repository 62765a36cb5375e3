pub mod api;
pub mod app;
pub mod config;
pub mod fetch_error;
pub mod importers;
pub mod measurement;
pub mod scheduler;
pub mod services;
pub mod telemetry;
pub mod utils;
