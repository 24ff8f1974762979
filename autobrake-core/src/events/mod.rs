//! ## autobrake-core::events
//! **Plain event records carried by the service bus**
//!
//! Sensors publish [`SpeedUpdate`] and [`ObstacleDetected`]; the controller
//! publishes [`BrakeCommand`]. [`SensorEvent`] is the tagged union of the two
//! inbound kinds, used wherever a single ordered stream of readings is needed
//! (scenario files, the live feed, direct controller drive).

pub mod sensor;

pub use sensor::{BrakeCommand, ObstacleDetected, SensorEvent, SpeedUpdate};
