mod actuator;
mod diagnostics;
mod error;
mod runtime;

pub use self::{
    actuator::BrakeActuator,
    diagnostics::DiagnosticsCollector,
    error::EngineError,
    runtime::{AutobrakeRuntime, RunReport},
};

pub mod prelude {
    pub use super::{AutobrakeRuntime, BrakeActuator, DiagnosticsCollector, EngineError, RunReport};
}
