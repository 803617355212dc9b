use thiserror::Error;

/// Terminal failures of a single simulation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("numerical instability at t={time:.6} s: {quantity} is not finite")]
    NumericalInstability { time: f64, quantity: &'static str },

    #[error("rocket did not land within {max_time} s of simulated time")]
    MaxDurationExceeded { max_time: f64 },
}

impl SimError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidConfiguration(msg.into())
    }
}

pub type SimResult<T> = Result<T, SimError>;
