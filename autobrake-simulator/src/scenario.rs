//! Recorded sensor scenarios.
//!
//! A scenario is an ordered list of timestamped readings plus the seed and
//! simulator settings that produced it. Scenarios are stored as YAML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use autobrake_config::SimulatorConfig;
use autobrake_core::SensorEvent;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scenario YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Event {index} at {timestamp_ns} ns precedes the previous event at {previous_ns} ns")]
    OutOfOrder {
        index: usize,
        timestamp_ns: u64,
        previous_ns: u64,
    },
}

/// A reading stamped with virtual time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub timestamp_ns: u64,
    pub event: SensorEvent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub seed: u64,
    #[serde(default)]
    pub config: SimulatorConfig,
    #[serde(default)]
    pub events: Vec<TimedEvent>,
}

impl Scenario {
    pub fn new(seed: u64, config: SimulatorConfig) -> Self {
        Self {
            seed,
            config,
            events: Vec::new(),
        }
    }

    /// Checks that timestamps never decrease.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (index, pair) in self.events.windows(2).enumerate() {
            if pair[1].timestamp_ns < pair[0].timestamp_ns {
                return Err(ScenarioError::OutOfOrder {
                    index: index + 1,
                    timestamp_ns: pair[1].timestamp_ns,
                    previous_ns: pair[0].timestamp_ns,
                });
            }
        }
        Ok(())
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ScenarioError> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
