use thiserror::Error;

use autobrake_config::ConfigError;
use autobrake_core::ControllerError;
use autobrake_simulator::ScenarioError;
use autobrake_telemetry::TelemetryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("Malformed sensor event on line {line}: {source}")]
    Feed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("State hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
