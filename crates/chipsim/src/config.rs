use crate::{
    ChipError, check_non_negative, check_positive,
    models::{MembraneModel, PermeabilityModel, PoreGeometryModel, PoreResistanceModel},
};
use gems::time_from_hours;
use serde::{Deserialize, Serialize};

/// Membrane resistance models which can be selected by configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembraneModelKind {
    PoreGeometry,
    PoreResistance,
    #[default]
    Permeability,
}

impl MembraneModelKind {
    pub fn build(self) -> Box<dyn MembraneModel> {
        match self {
            MembraneModelKind::PoreGeometry => Box::new(PoreGeometryModel),
            MembraneModelKind::PoreResistance => Box::new(PoreResistanceModel),
            MembraneModelKind::Permeability => Box::new(PermeabilityModel),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation time step [s]
    pub time_step: f64,

    /// Total simulated time [s]
    pub duration: f64,

    /// Upper bound on the number of time steps
    pub max_iterations: usize,

    /// Concentrations may leave [0, 1] by this much before the run fails
    pub concentration_tolerance: f64,

    pub membrane_model: MembraneModelKind,

    /// Relative pivot size below which the nodal system is considered singular
    pub singularity_threshold: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 10.,
            duration: time_from_hours(24.),
            max_iterations: 1_000_000,
            concentration_tolerance: 1e-6,
            membrane_model: MembraneModelKind::default(),
            singularity_threshold: 1e-12,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ChipError> {
        check_positive("time_step", self.time_step)?;
        check_positive("duration", self.duration)?;
        check_positive("max_iterations", self.max_iterations as f64)?;
        check_positive("singularity_threshold", self.singularity_threshold)?;
        if self.singularity_threshold >= 1. {
            return Err(ChipError::InvalidParameter {
                name: "singularity_threshold",
                value: self.singularity_threshold,
            });
        }
        check_non_negative("concentration_tolerance", self.concentration_tolerance)?;
        Ok(())
    }
}
