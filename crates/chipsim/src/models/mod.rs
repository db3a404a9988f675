//! Membrane resistance models
//!
//! A model computes the resistance of a membrane against a species crossing it. Models are pure
//! functions of membrane geometry, fluid properties and contact area.

mod permeability;
mod pore_geometry;
mod pore_resistance;

pub use permeability::*;
pub use pore_geometry::*;
pub use pore_resistance::*;

use crate::{Fluid, Membrane};

pub trait MembraneModel {
    /// Resistance [s/m^3] of `membrane` against `fluid` over the given contact `area` [m^2]
    fn membrane_resistance(&self, membrane: &Membrane, fluid: &Fluid, area: f64) -> f64;

    fn name(&self) -> &'static str;
}

impl<M: MembraneModel + ?Sized> MembraneModel for Box<M> {
    fn membrane_resistance(&self, membrane: &Membrane, fluid: &Fluid, area: f64) -> f64 {
        (**self).membrane_resistance(membrane, fluid, area)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Hagen-Poiseuille resistance of a single cylindrical pore running through the membrane
pub fn pore_resistance(membrane: &Membrane, fluid: &Fluid) -> f64 {
    8. * fluid.viscosity() * membrane.height()
        / (core::f64::consts::PI * membrane.pore_radius().powi(4))
}
