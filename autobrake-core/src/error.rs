use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ControllerError {
    #[error("Invalid parameter: {name} = {value} (must be at least {minimum})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        minimum: f64,
    },
}
