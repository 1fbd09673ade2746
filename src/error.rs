use crate::RouterId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimulatorError {
    #[error("router {0} does not exist in this topology")]
    UnknownRouter(RouterId),
    #[error("cannot link router {0} to itself")]
    SelfLink(RouterId),
    #[error("link weight {0} must be a non-negative finite number")]
    InvalidWeight(f64),
    #[error("simulation did not converge within {ticks} ticks")]
    DidNotConverge { ticks: u64 },
}

pub type Result<T> = std::result::Result<T, SimulatorError>;
