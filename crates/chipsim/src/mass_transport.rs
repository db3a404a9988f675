use crate::{
    ChipError, EdgeId, FluidId, FluidRegistry, Mixture, Network, TopologyError, TransportState,
    models::MembraneModel,
};
use std::collections::BTreeSet;

/// Amount of one species crossing one membrane during a time step
#[derive(Clone, Debug, PartialEq)]
pub struct MembraneExchange {
    pub membrane: EdgeId,
    pub channel: EdgeId,
    pub organ: EdgeId,
    pub species: FluidId,

    /// Concentration times volume [m^3] moved from the channel into the organ. Negative if the
    /// species moves from the organ into the channel.
    pub amount: f64,

    /// Volume [m^3] on the channel side taking part in the exchange
    pub channel_volume: f64,

    /// Volume [m^3] of the organ tank
    pub organ_volume: f64,
}

impl MembraneExchange {
    pub fn channel_delta(&self) -> f64 {
        -self.amount / self.channel_volume
    }

    pub fn organ_delta(&self) -> f64 {
        self.amount / self.organ_volume
    }
}

/// Moves species across membranes between channels and organ tanks.
///
/// The concentration difference across each membrane is advanced with one RK4 step using the
/// resistance given by the membrane model. All exchanges of a step are computed from the same
/// state before any of them is applied.
pub struct MassTransportIntegrator<'a> {
    model: &'a dyn MembraneModel,
}

impl<'a> MassTransportIntegrator<'a> {
    pub fn new(model: &'a dyn MembraneModel) -> Self {
        Self { model }
    }

    /// Computes the exchanges for a step of length `dt` starting at `time`
    pub fn compute(
        &self,
        net: &Network,
        fluids: &FluidRegistry,
        state: &TransportState,
        time: f64,
        dt: f64,
    ) -> Result<Vec<MembraneExchange>, ChipError> {
        let empty = Mixture::new();
        let mut exchanges = Vec::new();

        for (membrane_id, membrane) in net.membranes() {
            let organ_id = membrane
                .organ()
                .ok_or(TopologyError::MissingOrgan(membrane_id))?;
            let organ = net.organ(organ_id)?;
            let channel_id = membrane.channel();
            let channel = net.channel(channel_id)?;
            let flow_rate = net.flow_rate(channel_id)?;

            // The channel takes part with its own volume and what flows through it in this step.
            let channel_volume = channel.volume() + flow_rate.abs() * dt;
            let organ_volume = organ.volume();

            let channel_mix = state.channel(channel_id).unwrap_or(&empty);
            let organ_mix = state.organ(organ_id).unwrap_or(&empty);

            let species: BTreeSet<FluidId> =
                channel_mix.species().chain(organ_mix.species()).collect();

            for species in species {
                let delta = channel_mix.concentration(species) - organ_mix.concentration(species);
                if delta == 0. {
                    continue;
                }

                let fluid = fluids.get(species)?;
                let resistance = self
                    .model
                    .membrane_resistance(membrane, fluid, membrane.area())
                    + organ.resistance();
                if !(resistance > 0.) {
                    return Err(ChipError::IntegrationInstability {
                        time,
                        reason: format!(
                            "membrane {membrane_id:?} has resistance {resistance} for {species:?}"
                        ),
                    });
                }

                let amount = membrane.concentration_change(resistance, dt, delta, time);
                if amount == 0. {
                    continue;
                }

                exchanges.push(MembraneExchange {
                    membrane: membrane_id,
                    channel: channel_id,
                    organ: organ_id,
                    species,
                    amount,
                    channel_volume,
                    organ_volume,
                });
            }
        }

        Ok(exchanges)
    }

    pub fn apply(state: &mut TransportState, exchanges: &[MembraneExchange]) {
        for ex in exchanges {
            state
                .channels
                .entry(ex.channel)
                .or_default()
                .add_concentration(ex.species, ex.channel_delta());
            state
                .organs
                .entry(ex.organ)
                .or_default()
                .add_concentration(ex.species, ex.organ_delta());
        }
    }

    /// Computes and applies all exchanges of one time step
    pub fn step(
        &self,
        net: &Network,
        fluids: &FluidRegistry,
        state: &mut TransportState,
        time: f64,
        dt: f64,
    ) -> Result<Vec<MembraneExchange>, ChipError> {
        let exchanges = self.compute(net, fluids, state, time, dt)?;
        Self::apply(state, &exchanges);
        log::debug!(
            "t={time:.1}s: {} membrane exchanges using {} model",
            exchanges.len(),
            self.model.name()
        );
        Ok(exchanges)
    }
}
