use crate::{ChipError, check_positive};
use gems::{Cuboid, VISCOSITY_WATER};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    #[default]
    Normal,
    Bypass,
    Cloggable,
}

/// Rectangular duct connecting two nodes
#[derive(Clone, Debug)]
pub struct Channel {
    geometry: Cuboid,
    kind: ChannelKind,
    resistance: f64,
    fixed_resistance: bool,
}

impl Channel {
    /// Creates a channel with the given cross section and length.
    ///
    /// The hydraulic resistance is initialized for water and updated for the continuous phase
    /// when a simulation is initialized.
    pub fn new(
        height: f64,
        width: f64,
        length: f64,
        kind: ChannelKind,
    ) -> Result<Self, ChipError> {
        let geometry = Cuboid::new(
            check_positive("height", height)?,
            check_positive("width", width)?,
            check_positive("length", length)?,
        );
        Ok(Self {
            geometry,
            kind,
            resistance: rectangular_duct_resistance(&geometry, VISCOSITY_WATER),
            fixed_resistance: false,
        })
    }

    pub fn geometry(&self) -> &Cuboid {
        &self.geometry
    }

    pub fn height(&self) -> f64 {
        self.geometry.height
    }

    pub fn width(&self) -> f64 {
        self.geometry.width
    }

    pub fn length(&self) -> f64 {
        self.geometry.length
    }

    pub fn area(&self) -> f64 {
        self.geometry.cross_section_area()
    }

    pub fn volume(&self) -> f64 {
        self.geometry.volume()
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Hydraulic resistance [Pa s / m^3]
    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Replaces the geometric resistance by a fixed value which is kept for all fluids
    pub fn set_resistance(&mut self, resistance: f64) -> Result<(), ChipError> {
        self.resistance = check_positive("resistance", resistance)?;
        self.fixed_resistance = true;
        Ok(())
    }

    pub fn has_fixed_resistance(&self) -> bool {
        self.fixed_resistance
    }

    /// Recomputes the resistance for a liquid with the given viscosity
    pub fn update_resistance(&mut self, viscosity: f64) {
        if !self.fixed_resistance {
            self.resistance = rectangular_duct_resistance(&self.geometry, viscosity);
        }
    }
}

/// Hydraulic resistance of a rectangular duct with laminar flow.
///
/// Uses the approximation R = 12 mu L / (w h^3 (1 - 0.63 h / w)) where h is the smaller side of
/// the cross section.
pub fn rectangular_duct_resistance(geometry: &Cuboid, viscosity: f64) -> f64 {
    let (h, w) = if geometry.height <= geometry.width {
        (geometry.height, geometry.width)
    } else {
        (geometry.width, geometry.height)
    };
    12. * viscosity * geometry.length / (w * h.powi(3) * (1. - 0.63 * h / w))
}
