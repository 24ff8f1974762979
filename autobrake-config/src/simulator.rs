//! Simulator configuration.
//!
//! Parameters for deterministic sensor traffic: the seed, how many readings
//! to generate, the virtual tick, and the envelope random readings are drawn
//! from.
use std::path::{Path, PathBuf};

use figment::providers::{Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;
use crate::ConfigError;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Seed for deterministic simulation.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of sensor readings to simulate.
    #[validate(range(min = 1))]
    #[serde(default = "default_event_count")]
    pub event_count: usize,

    /// Virtual time between readings (milliseconds).
    #[validate(range(min = 1, max = 10_000))]
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Upper bound for ego and obstacle speeds (m/s).
    #[validate(range(min = 0.0))]
    #[validate(custom(function = validation::validate_finite))]
    #[serde(default = "default_max_speed_mps")]
    pub max_speed_mps: f64,

    /// Upper bound for obstacle distance (m).
    #[validate(range(min = 1.0))]
    #[validate(custom(function = validation::validate_finite))]
    #[serde(default = "default_max_distance_m")]
    pub max_distance_m: f64,

    /// Probability that a reading is an obstacle report rather than a speed update.
    #[validate(range(min = 0.0, max = 1.0))]
    #[validate(custom(function = validation::validate_finite))]
    #[serde(default = "default_obstacle_probability")]
    pub obstacle_probability: f64,

    /// Probability that a reading is lost before reaching the bus.
    #[validate(range(min = 0.0, max = 1.0))]
    #[validate(custom(function = validation::validate_finite))]
    #[serde(default)]
    pub sensor_dropout: f64,
}

fn default_seed() -> u64 {
    42
}

fn default_event_count() -> usize {
    1000
}

fn default_tick_ms() -> u64 {
    100
}

fn default_max_speed_mps() -> f64 {
    40.0
}

fn default_max_distance_m() -> f64 {
    200.0
}

fn default_obstacle_probability() -> f64 {
    0.3
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            event_count: default_event_count(),
            tick_ms: default_tick_ms(),
            max_speed_mps: default_max_speed_mps(),
            max_distance_m: default_max_distance_m(),
            obstacle_probability: default_obstacle_probability(),
            sensor_dropout: 0.0,
        }
    }
}

impl SimulatorConfig {
    /// Load only the simulator section from a standalone YAML file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(SimulatorConfig::default()))
            .merge(Yaml::file(path))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
