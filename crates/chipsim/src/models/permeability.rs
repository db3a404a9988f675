use crate::{Fluid, Membrane, models::MembraneModel};

/// Solution-diffusion model: the species diffuses through the membrane with permeability
/// D / h, giving R = h / (D A).
///
/// A species without diffusivity does not cross the membrane and sees an infinite resistance.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermeabilityModel;

impl PermeabilityModel {
    /// Permeability [m/s] of the membrane for the species
    pub fn permeability(membrane: &Membrane, fluid: &Fluid) -> f64 {
        fluid.diffusivity() / membrane.height()
    }
}

impl MembraneModel for PermeabilityModel {
    fn membrane_resistance(&self, membrane: &Membrane, fluid: &Fluid, area: f64) -> f64 {
        let conductance = Self::permeability(membrane, fluid) * area;
        if conductance > 0. {
            1. / conductance
        } else {
            f64::INFINITY
        }
    }

    fn name(&self) -> &'static str {
        "permeability"
    }
}
