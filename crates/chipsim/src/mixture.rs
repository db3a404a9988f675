use crate::{Fluid, FluidId};
use gems::Lerp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Species concentrations carried by a volume of liquid.
///
/// Species which are not listed have concentration 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mixture {
    concentrations: BTreeMap<FluidId, f64>,
}

impl Mixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mixture consisting only of the given fluid at its own concentration
    pub fn pure(fluid: &Fluid) -> Self {
        Self::from_iter([(fluid.id(), fluid.concentration())])
    }

    pub fn concentration(&self, species: FluidId) -> f64 {
        self.concentrations.get(&species).copied().unwrap_or(0.)
    }

    /// Adds `delta` to the concentration of a species
    pub fn add_concentration(&mut self, species: FluidId, delta: f64) {
        *self.concentrations.entry(species).or_insert(0.) += delta;
    }

    pub fn species(&self) -> impl Iterator<Item = FluidId> + '_ {
        self.concentrations.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FluidId, f64)> + '_ {
        self.concentrations.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.concentrations.is_empty()
    }

    /// Smallest and largest concentration over all species
    pub fn range(&self) -> Option<(f64, f64)> {
        self.concentrations.values().fold(None, |acc, &c| match acc {
            None => Some((c, c)),
            Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
        })
    }
}

impl FromIterator<(FluidId, f64)> for Mixture {
    fn from_iter<T: IntoIterator<Item = (FluidId, f64)>>(iter: T) -> Self {
        Self {
            concentrations: iter.into_iter().collect(),
        }
    }
}

impl Lerp<f64> for Mixture {
    fn lerp_impl(&self, q: f64, other: &Self) -> Self {
        let mut out = self.clone();
        for c in out.concentrations.values_mut() {
            *c *= 1. - q;
        }
        for (species, c) in other.iter() {
            out.add_concentration(species, q * c);
        }
        out
    }
}
