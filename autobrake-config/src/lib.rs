//! # Autobrake Configuration System
//!
//! Layered configuration for the controller, telemetry, and simulator.
//!
//! ## Features
//! - **Unified Configuration**: one document covers every component
//! - **Validation**: every section is checked with `validator` after merging
//! - **Environment Awareness**: per-environment YAML plus `AUTOBRAKE_*` overrides

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

mod controller;
mod error;
mod simulator;
mod telemetry;
mod validation;

pub use controller::ControllerConfig;
pub use error::ConfigError;
pub use simulator::SimulatorConfig;
pub use telemetry::TelemetryConfig;

/// Base configuration file, relative to the working directory.
pub const BASE_CONFIG_FILE: &str = "config/autobrake.yaml";

/// Prefix for environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "AUTOBRAKE_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct AutobrakeConfig {
    /// Braking decision parameters.
    #[validate(nested)]
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Logging and metrics.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Deterministic traffic simulation.
    #[validate(nested)]
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl AutobrakeConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/autobrake.yaml`, when present
    /// 3. `config/<AUTOBRAKE_ENV>.yaml`, when present (`production` by default)
    /// 4. `AUTOBRAKE_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract_validated(Self::figment())
    }

    /// The merged provider stack used by [`AutobrakeConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AutobrakeConfig::default()));

        if Path::new(BASE_CONFIG_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_CONFIG_FILE));
        } else {
            info!("{} not found, using default configuration", BASE_CONFIG_FILE);
        }

        let env = std::env::var("AUTOBRAKE_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            debug!("Merging environment overrides from {}", env_file);
            figment = figment.merge(Yaml::file(env_file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration from a specific file, on top of defaults and
    /// below environment overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Self::extract_validated(
            Figment::from(Serialized::defaults(AutobrakeConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Render the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::from)
    }

    fn extract_validated(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
