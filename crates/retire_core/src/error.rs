//! Engine error types.
//!
//! Structural failures abort a run with `status=error`; data-shape anomalies
//! (missing holding on withdraw, a clamped intent) are recovered from locally
//! and only logged via `tracing`.

use std::fmt;

use crate::model::HoldingId;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Debug)]
pub enum SimulationError {
    InvalidSnapshot(String),
    EmptyPopulation,
    MissingReference(MissingReferenceKind),
    WorkerFailure(String),
    Timeout,
}

#[derive(Debug)]
pub enum MissingReferenceKind {
    Holding(HoldingId),
    Strategy(crate::model::StrategyId),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidSnapshot(msg) => write!(f, "invalid snapshot: {msg}"),
            SimulationError::EmptyPopulation => {
                write!(f, "no active people referenced by the scenario")
            }
            SimulationError::MissingReference(MissingReferenceKind::Holding(id)) => {
                write!(f, "referenced holding not found: {id:?}")
            }
            SimulationError::MissingReference(MissingReferenceKind::Strategy(id)) => {
                write!(f, "referenced strategy not found: {id:?}")
            }
            SimulationError::WorkerFailure(msg) => write!(f, "worker failure: {msg}"),
            SimulationError::Timeout => write!(f, "run exceeded its wall-clock bound"),
        }
    }
}

impl std::error::Error for SimulationError {}
