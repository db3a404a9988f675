use crate::{Fluid, Membrane, models::MembraneModel, models::pore_resistance};

/// Pores acting as parallel resistors: the single pore resistance divided by the number of pores
/// within the contact area.
#[derive(Clone, Copy, Debug, Default)]
pub struct PoreResistanceModel;

impl MembraneModel for PoreResistanceModel {
    fn membrane_resistance(&self, membrane: &Membrane, fluid: &Fluid, area: f64) -> f64 {
        pore_resistance(membrane, fluid) / membrane.number_of_pores(area)
    }

    fn name(&self) -> &'static str {
        "pore resistance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_util;
    use gems::VISCOSITY_MEDIUM;

    #[test]
    fn test_pore_resistance_model() {
        let (net, id) = test_util::membrane();
        let m = test_util::get(&net, id);
        let fluid = test_util::medium();

        // 8 mu h / (porosity r^2 A)
        let expected = 8. * VISCOSITY_MEDIUM * 55e-6 / (0.14 * 1e-10 * m.area());
        let actual = PoreResistanceModel.membrane_resistance(m, &fluid, m.area());
        approx::assert_relative_eq!(actual, expected, max_relative = 1e-9);
    }
}
