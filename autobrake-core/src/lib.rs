//! # autobrake-core
//!
//! Reactive collision-avoidance core.
//!
//! A [`CollisionController`] subscribes to vehicle speed and forward obstacle
//! reports on a [`ServiceBus`] and publishes a [`BrakeCommand`] whenever the
//! time-to-collision with the reported obstacle falls inside its threshold.
//!
//! ### Key Submodules:
//! - `events`: sensor and actuator event records
//! - `bus`: the `ServiceBus` capability plus in-process and recording backends
//! - `controller`: state and braking decision

pub mod bus;
pub mod controller;
pub mod error;
pub mod events;

pub mod prelude {
    pub use crate::bus::*;
    pub use crate::controller::*;
    pub use crate::error::*;
    pub use crate::events::*;
}

pub use bus::{InProcessBus, RecordingBus, ServiceBus};
pub use controller::CollisionController;
pub use error::ControllerError;
pub use events::{BrakeCommand, ObstacleDetected, SensorEvent, SpeedUpdate};
