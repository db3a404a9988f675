use crate::{Fluid, Membrane, models::MembraneModel, models::pore_resistance};

/// Parallel pores: the single pore resistance divided by the porous part of the contact area.
#[derive(Clone, Copy, Debug, Default)]
pub struct PoreGeometryModel;

impl MembraneModel for PoreGeometryModel {
    fn membrane_resistance(&self, membrane: &Membrane, fluid: &Fluid, area: f64) -> f64 {
        pore_resistance(membrane, fluid) / (area * membrane.porosity())
    }

    fn name(&self) -> &'static str {
        "pore geometry"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_util;
    use gems::VISCOSITY_MEDIUM;

    #[test]
    fn test_pore_geometry_model() {
        let (net, id) = test_util::membrane();
        let m = test_util::get(&net, id);
        let fluid = test_util::medium();

        let pore = 8. * VISCOSITY_MEDIUM * 55e-6 / (core::f64::consts::PI * 1e-20);
        let expected = pore / (m.area() * 0.14);
        let actual = PoreGeometryModel.membrane_resistance(m, &fluid, m.area());
        approx::assert_relative_eq!(actual, expected, max_relative = 1e-12);
        approx::assert_relative_eq!(pore_resistance(m, &fluid), pore, max_relative = 1e-12);
    }

    #[test]
    fn test_larger_area_lowers_resistance() {
        let (net, id) = test_util::membrane();
        let m = test_util::get(&net, id);
        let fluid = test_util::medium();
        let r1 = PoreGeometryModel.membrane_resistance(m, &fluid, 1e-5);
        let r2 = PoreGeometryModel.membrane_resistance(m, &fluid, 2e-5);
        approx::assert_relative_eq!(r1, 2. * r2, max_relative = 1e-12);
    }
}
