use crate::{ChipError, InvalidReference, check_non_negative, check_positive};
use gems::Lerp;
use serde::{Deserialize, Serialize};
use slab::Slab;
use std::ops::Deref;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FluidId(pub usize);

impl Deref for FluidId {
    type Target = usize;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Parameters for creating a new fluid
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FluidDef {
    pub name: String,

    /// Dynamic viscosity [Pa s]
    pub viscosity: f64,

    /// Density [kg/m^3]
    pub density: f64,

    /// Diffusion coefficient of the carried species [m^2/s]
    pub diffusivity: f64,

    /// Concentration of the carried species in [0, 1]
    pub concentration: f64,
}

/// A chemical species or phase flowing through the chip.
///
/// Fluids are immutable once registered, except for their name. They are referenced everywhere
/// by [FluidId] and compared by id.
#[derive(Clone, Debug, Serialize)]
pub struct Fluid {
    id: FluidId,
    name: String,
    viscosity: f64,
    density: f64,
    diffusivity: f64,
    concentration: f64,
    mixed_fluids: Vec<FluidId>,
}

impl Fluid {
    pub fn id(&self) -> FluidId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn diffusivity(&self) -> f64 {
        self.diffusivity
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    /// Fluids this fluid was mixed from. Empty for fluids which were added directly.
    pub fn mixed_fluids(&self) -> &[FluidId] {
        &self.mixed_fluids
    }
}

/// Owns all fluids known to a simulation
#[derive(Clone, Debug, Default)]
pub struct FluidRegistry {
    fluids: Slab<Fluid>,
}

impl FluidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, def: FluidDef) -> Result<FluidId, ChipError> {
        check_positive("viscosity", def.viscosity)?;
        check_positive("density", def.density)?;
        check_non_negative("diffusivity", def.diffusivity)?;
        if !(0. ..=1.).contains(&def.concentration) {
            return Err(ChipError::InvalidParameter {
                name: "concentration",
                value: def.concentration,
            });
        }

        Ok(self.insert(def, Vec::new()))
    }

    fn insert(&mut self, def: FluidDef, mixed_fluids: Vec<FluidId>) -> FluidId {
        let entry = self.fluids.vacant_entry();
        let id = FluidId(entry.key());
        entry.insert(Fluid {
            id,
            name: def.name,
            viscosity: def.viscosity,
            density: def.density,
            diffusivity: def.diffusivity,
            concentration: def.concentration,
            mixed_fluids,
        });
        id
    }

    pub fn get(&self, id: FluidId) -> Result<&Fluid, InvalidReference> {
        self.fluids.get(*id).ok_or(InvalidReference::Fluid(id))
    }

    pub fn get_mut(&mut self, id: FluidId) -> Result<&mut Fluid, InvalidReference> {
        self.fluids.get_mut(*id).ok_or(InvalidReference::Fluid(id))
    }

    pub fn contains(&self, id: FluidId) -> bool {
        self.fluids.contains(*id)
    }

    pub fn len(&self) -> usize {
        self.fluids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fluids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fluid> {
        self.fluids.iter().map(|(_, f)| f)
    }

    /// Creates a new fluid by mixing given volumes [m^3] of existing fluids.
    ///
    /// Viscosity, density, diffusivity and concentration are averaged weighted by volume. The
    /// new fluid remembers the fluids it was mixed from.
    pub fn mix(&mut self, parts: &[(FluidId, f64)]) -> Result<FluidId, ChipError> {
        let mut fluids = Vec::with_capacity(parts.len());
        for &(id, volume) in parts {
            check_non_negative("volume", volume)?;
            fluids.push((volume, self.get(id)?));
        }

        let average = |prop: fn(&Fluid) -> f64| {
            let values: Vec<(f64, f64)> = fluids.iter().map(|(v, f)| (*v, prop(f))).collect();
            f64::weighted_average(values.iter().map(|(v, x)| (*v, x)))
        };

        let (Some(viscosity), Some(density), Some(diffusivity), Some(concentration)) = (
            average(Fluid::viscosity),
            average(Fluid::density),
            average(Fluid::diffusivity),
            average(Fluid::concentration),
        ) else {
            return Err(ChipError::InvalidParameter {
                name: "volume",
                value: parts.iter().map(|(_, v)| v).sum(),
            });
        };

        let name = fluids
            .iter()
            .filter(|(v, _)| *v > 0.)
            .map(|(_, f)| f.name())
            .collect::<Vec<_>>()
            .join("+");

        let mut mixed_fluids: Vec<FluidId> = parts
            .iter()
            .filter(|(_, v)| *v > 0.)
            .map(|(id, _)| *id)
            .collect();
        mixed_fluids.sort();
        mixed_fluids.dedup();

        let def = FluidDef {
            name,
            viscosity,
            density,
            diffusivity,
            concentration,
        };
        Ok(self.insert(def, mixed_fluids))
    }
}
