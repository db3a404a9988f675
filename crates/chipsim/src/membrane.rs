use crate::EdgeId;
use gems::{Cuboid, FnODE, disk_area, runge_kutta_4_increment};

/// Porous membrane separating a channel from an organ tank.
///
/// The membrane spans the full length of its channel. Its height is the membrane thickness and
/// its width the extent of the contact face.
#[derive(Clone, Debug)]
pub struct Membrane {
    pub(crate) geometry: Cuboid,
    pub(crate) pore_radius: f64,
    pub(crate) porosity: f64,
    pub(crate) channel: EdgeId,
    pub(crate) organ: Option<EdgeId>,
}

impl Membrane {
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

    pub fn pore_radius(&self) -> f64 {
        self.pore_radius
    }

    pub fn pore_diameter(&self) -> f64 {
        2. * self.pore_radius
    }

    /// Fraction of the membrane area covered by pores
    pub fn porosity(&self) -> f64 {
        self.porosity
    }

    /// Contact area with the channel and organ
    pub fn area(&self) -> f64 {
        self.geometry.area()
    }

    pub fn volume(&self) -> f64 {
        self.geometry.volume()
    }

    /// Channel this membrane is attached to
    pub fn channel(&self) -> EdgeId {
        self.channel
    }

    /// Organ tank on the far side of the membrane, if one was attached
    pub fn organ(&self) -> Option<EdgeId> {
        self.organ
    }

    /// Number of pores within the given area
    pub fn number_of_pores(&self, area: f64) -> f64 {
        self.porosity * area / disk_area(self.pore_radius)
    }

    pub fn pore_density(&self) -> f64 {
        self.porosity * disk_area(self.pore_radius)
    }

    /// Concentration change across the membrane during one time step.
    ///
    /// Integrates dC/dt = C / R with RK4 over a single step of size `dt` starting from the
    /// concentration difference `delta` at time `t`. An infinite resistance blocks all exchange.
    pub fn concentration_change(&self, resistance: f64, dt: f64, delta: f64, t: f64) -> f64 {
        let permeability = 1. / resistance;
        runge_kutta_4_increment(t, delta, dt, FnODE(|_, c: f64| permeability * c))
    }
}
