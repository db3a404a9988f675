use crate::{EdgeId, FluidId, NodeId, SimulationState};
use gems::LinearSolverError;
use thiserror::Error;

/// Reasons for a network to be rejected before simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("network has no ground node")]
    MissingGround,

    #[error("network has {0} ground nodes but exactly one is required")]
    MultipleGrounds(usize),

    #[error("node {0:?} is not connected to the ground node")]
    Unreachable(NodeId),

    #[error(
        "membrane {membrane:?} has length {membrane_length} but attached edge {other:?} has length {other_length}"
    )]
    LengthMismatch {
        membrane: EdgeId,
        other: EdgeId,
        membrane_length: f64,
        other_length: f64,
    },

    #[error("edge {0:?} has a non-positive resistance")]
    NonPositiveResistance(EdgeId),

    #[error("membrane {0:?} has no organ attached")]
    MissingOrgan(EdgeId),

    #[error("membrane {membrane:?} already has organ {organ:?} attached")]
    OrganAlreadyAttached { membrane: EdgeId, organ: EdgeId },

    #[error("organ {0:?} is not attached to its membrane")]
    DetachedOrgan(EdgeId),
}

/// An id passed to a public operation does not refer to an object of the expected kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidReference {
    #[error("unknown node {0:?}")]
    Node(NodeId),

    #[error("unknown edge {0:?}")]
    Edge(EdgeId),

    #[error("unknown fluid {0:?}")]
    Fluid(FluidId),

    #[error("edge {0:?} is not a channel")]
    Channel(EdgeId),

    #[error("edge {0:?} is not a membrane")]
    Membrane(EdgeId),

    #[error("edge {0:?} is not an organ")]
    Organ(EdgeId),

    #[error("edge {0:?} is not a pump")]
    Pump(EdgeId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChipError {
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),

    #[error("nodal system could not be solved: {0:?}")]
    SolverSingularity(LinearSolverError),

    #[error("integration became unstable at t={time} s: {reason}")]
    IntegrationInstability { time: f64, reason: String },

    #[error(transparent)]
    InvalidReference(#[from] InvalidReference),

    #[error("invalid value for parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("operation not permitted in simulation state {0:?}")]
    InvalidState(SimulationState),

    #[error("no network attached to the simulation")]
    MissingNetwork,

    #[error("no continuous phase fluid set")]
    MissingContinuousPhase,
}

impl From<LinearSolverError> for ChipError {
    fn from(err: LinearSolverError) -> Self {
        ChipError::SolverSingularity(err)
    }
}

/// Checks that a geometric or physical parameter is strictly positive and finite
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<f64, ChipError> {
    if value.is_finite() && value > 0. {
        Ok(value)
    } else {
        Err(ChipError::InvalidParameter { name, value })
    }
}

/// Checks that a parameter is non-negative and finite
pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<f64, ChipError> {
    if value.is_finite() && value >= 0. {
        Ok(value)
    } else {
        Err(ChipError::InvalidParameter { name, value })
    }
}
