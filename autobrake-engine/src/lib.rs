/*!
# Autobrake Engine

Wires the collision controller to a bus, a brake actuator, and metrics, and
drives it from simulated, recorded, or live sensor traffic. Frontends (the
CLI today) share this implementation of the three run modes and of hash
validation.
*/

pub mod engine;

pub use engine::{
    AutobrakeRuntime, BrakeActuator, DiagnosticsCollector, EngineError, RunReport,
};
