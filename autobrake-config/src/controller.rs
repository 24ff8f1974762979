//! Braking controller configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Controller parameters applied when the runtime is built.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Time-to-collision window in seconds. Must be at least one second.
    #[validate(range(min = 1.0, message = "collision threshold must be at least 1.0 s"))]
    #[serde(default = "default_collision_threshold_s")]
    pub collision_threshold_s: f64,
}

fn default_collision_threshold_s() -> f64 {
    5.0
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            collision_threshold_s: default_collision_threshold_s(),
        }
    }
}
