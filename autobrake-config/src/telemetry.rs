//! Observability configuration.
//!
//! Parameters for system instrumentation:
//! - Log verbosity and format
//! - Prometheus metrics collection

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Telemetry configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Default log level; `RUST_LOG` takes precedence when set.
    #[validate(custom(function = validation::validate_log_level))]
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable text.
    #[serde(default)]
    pub json_logs: bool,

    /// Register Prometheus collectors on the runtime bus.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_true() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            metrics_enabled: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_default_telemetry_config() {
        TelemetryConfig::default()
            .validate()
            .expect("Default config should be valid");
    }

    #[test]
    fn invalid_log_level() {
        let config = TelemetryConfig {
            log_level: "chatty".into(),
            ..TelemetryConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
