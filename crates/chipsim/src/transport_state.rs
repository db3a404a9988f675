use crate::{ChipError, EdgeId, Mixture, Network};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Species concentrations held by every channel and organ tank
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportState {
    pub channels: BTreeMap<EdgeId, Mixture>,
    pub organs: BTreeMap<EdgeId, Mixture>,
}

impl TransportState {
    /// Fills all channels and organs of the network with the given mixture
    pub fn filled(net: &Network, mixture: &Mixture) -> Self {
        Self {
            channels: net
                .channels()
                .map(|(id, _, _)| (id, mixture.clone()))
                .collect(),
            organs: net.organs().map(|(id, _)| (id, mixture.clone())).collect(),
        }
    }

    pub fn channel(&self, id: EdgeId) -> Option<&Mixture> {
        self.channels.get(&id)
    }

    pub fn organ(&self, id: EdgeId) -> Option<&Mixture> {
        self.organs.get(&id)
    }

    /// Mixture of a channel or an organ
    pub fn get(&self, id: EdgeId) -> Option<&Mixture> {
        self.channel(id).or_else(|| self.organ(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, &Mixture)> {
        self.channels
            .iter()
            .chain(self.organs.iter())
            .map(|(id, m)| (*id, m))
    }

    /// Checks that all concentrations stay within [0, 1] up to `tolerance`.
    ///
    /// Concentrations outside the unit interval but within tolerance are reported as a warning.
    pub fn check_bounds(&self, tolerance: f64, time: f64) -> Result<(), ChipError> {
        for (id, mixture) in self.iter() {
            for (species, c) in mixture.iter() {
                if !c.is_finite() || c < -tolerance || c > 1. + tolerance {
                    return Err(ChipError::IntegrationInstability {
                        time,
                        reason: format!(
                            "concentration of {species:?} in edge {id:?} is {c} which is outside of [0, 1]"
                        ),
                    });
                }
                if !(0. ..=1.).contains(&c) {
                    log::warn!(
                        "t={time:.1}s: concentration of {species:?} in edge {id:?} is {c:e}, outside of [0, 1] within tolerance"
                    );
                }
            }
        }
        Ok(())
    }
}
