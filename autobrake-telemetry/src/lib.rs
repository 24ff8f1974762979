//! # Autobrake Telemetry
//!
//! Crate for logging and metrics.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
