use chipsim::{
    ChannelKind, ChipError, EdgeId, FluidDef, FluidId, Network, NodeId, Simulation,
    SimulationConfig,
};
use gems::{
    DENSITY_MEDIUM, DIFFUSIVITY_SMALL_MOLECULE, VISCOSITY_MEDIUM,
    flow_from_milli_liters_per_minute, length_from_micro_meters, length_from_milli_meters,
    volume_from_milli_liters,
};
use serde::{Deserialize, Serialize};

/// Geometry and operating point of the organ tank chip.
///
/// Three channels in series are driven by a syringe pump. The first and the last channel each
/// carry a membrane with an organ tank on top.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganTankParams {
    /// Pump flow rate [m^3/s]
    pub flow_rate: f64,

    pub channel_height: f64,
    pub channel_width: f64,
    pub channel_lengths: [f64; 3],

    /// Membrane thickness [m]
    pub membrane_height: f64,
    pub membrane_widths: [f64; 2],
    pub pore_radius: f64,
    pub porosity: f64,

    pub organ_height: f64,

    /// Volume of each organ tank [m^3]
    pub organ_volume: f64,
}

impl Default for OrganTankParams {
    fn default() -> Self {
        let channel_lengths = [
            length_from_milli_meters(8.),
            length_from_milli_meters(5.),
            length_from_milli_meters(8.),
        ];
        let membrane_width = length_from_milli_meters(4.);
        Self {
            flow_rate: flow_from_milli_liters_per_minute(3.3),
            channel_height: length_from_milli_meters(0.3),
            channel_width: length_from_milli_meters(5.),
            channel_lengths,
            membrane_height: length_from_micro_meters(55.),
            // the second membrane is partially covered
            membrane_widths: [
                membrane_width,
                membrane_width - 6.28318e-6 / channel_lengths[2],
            ],
            pore_radius: length_from_micro_meters(10.),
            porosity: 0.14,
            organ_height: length_from_milli_meters(13.),
            organ_volume: volume_from_milli_liters(1.5),
        }
    }
}

/// The organ tank chip set up for a simulation run
pub struct OrganTank {
    pub simulation: Simulation,
    pub ground: NodeId,
    pub pump: EdgeId,
    pub channels: [EdgeId; 3],
    pub membranes: [EdgeId; 2],
    pub organs: [EdgeId; 2],
    pub medium: FluidId,
    pub drug: FluidId,
}

impl OrganTank {
    /// Builds the chip with default geometry. Culture medium fills the chip and a drug is
    /// injected by the pump from t=0 on.
    pub fn new(config: SimulationConfig) -> Result<Self, ChipError> {
        Self::with_params(config, &OrganTankParams::default())
    }

    pub fn with_params(
        config: SimulationConfig,
        params: &OrganTankParams,
    ) -> Result<Self, ChipError> {
        let mut net = Network::new();
        let n0 = net.add_node();
        let n1 = net.add_node();
        let n2 = net.add_node();
        let ground = net.add_node();

        let pump = net.add_flow_rate_pump(ground, n0, params.flow_rate)?;

        let mut channels = [EdgeId(0); 3];
        for (i, (a, b)) in [(n0, n1), (n1, n2), (n2, ground)].into_iter().enumerate() {
            channels[i] = net.add_channel(
                a,
                b,
                params.channel_height,
                params.channel_width,
                params.channel_lengths[i],
                ChannelKind::Normal,
            )?;
        }

        let mut membranes = [EdgeId(0); 2];
        let mut organs = [EdgeId(0); 2];
        for (i, k) in [0, 2].into_iter().enumerate() {
            membranes[i] = net.add_membrane_to_channel(
                channels[k],
                params.membrane_height,
                params.membrane_widths[i],
                params.pore_radius,
                params.porosity,
            )?;
            let organ_width =
                params.organ_volume / (params.organ_height * params.channel_lengths[k]);
            organs[i] = net.add_organ_to_membrane(membranes[i], params.organ_height, organ_width)?;
        }

        net.set_ground(ground)?;
        net.set_sink(ground)?;

        let mut simulation = Simulation::new(config)?;
        let medium = simulation.add_fluid(FluidDef {
            name: "medium".into(),
            viscosity: VISCOSITY_MEDIUM,
            density: DENSITY_MEDIUM,
            diffusivity: DIFFUSIVITY_SMALL_MOLECULE,
            concentration: 0.,
        })?;
        let drug = simulation.add_fluid(FluidDef {
            name: "drug".into(),
            viscosity: VISCOSITY_MEDIUM,
            density: DENSITY_MEDIUM,
            diffusivity: DIFFUSIVITY_SMALL_MOLECULE,
            concentration: 1.,
        })?;
        simulation.set_continuous_phase(medium)?;
        simulation.set_network(net);
        simulation.add_mixture_injection(drug, pump, 0.)?;

        log::info!(
            "organ tank chip: flow rate {:.3e} m^3/s, organ volume {:.3e} m^3",
            params.flow_rate,
            params.organ_volume
        );

        Ok(Self {
            simulation,
            ground,
            pump,
            channels,
            membranes,
            organs,
            medium,
            drug,
        })
    }

    /// Drug concentration in an organ tank at the given time [s]
    pub fn organ_concentration(&self, organ: usize, time: f64) -> Option<f64> {
        self.simulation
            .results()
            .concentration_at(*self.organs.get(organ)?, self.drug, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let p = OrganTankParams::default();
        approx::assert_relative_eq!(p.membrane_widths[1], 4e-3 - 7.853975e-4, max_relative = 1e-9);
        approx::assert_relative_eq!(p.organ_volume, 1.5e-6, max_relative = 1e-12);
    }

    #[test]
    fn test_chip_layout() {
        let mut chip = OrganTank::new(SimulationConfig::default()).unwrap();
        chip.simulation.initialize().unwrap();

        let net = chip.simulation.network().unwrap();
        assert!(net.is_valid());
        assert_eq!(net.node_count(), 4);
        assert_eq!(net.edge_count(), 8);
        assert_eq!(net.sinks(), vec![chip.ground]);

        for (i, organ) in chip.organs.into_iter().enumerate() {
            let organ = net.organ(organ).unwrap();
            approx::assert_relative_eq!(organ.volume(), 1.5e-6, max_relative = 1e-12);
            assert_eq!(organ.membrane(), chip.membranes[i]);
        }
        assert!(
            net.membrane(chip.membranes[1]).unwrap().area()
                < net.membrane(chip.membranes[0]).unwrap().area()
        );
    }
}
