use crate::EdgeId;
use gems::Cuboid;

/// Well-mixed tank on the far side of a membrane.
///
/// Organs never carry a bulk flow. Species reach them only by crossing the membrane.
#[derive(Clone, Debug)]
pub struct Organ {
    pub(crate) geometry: Cuboid,
    pub(crate) membrane: EdgeId,
    pub(crate) resistance: f64,
}

impl Organ {
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

    /// Area of the face in contact with the membrane
    pub fn area(&self) -> f64 {
        self.geometry.area()
    }

    pub fn volume(&self) -> f64 {
        self.geometry.volume()
    }

    pub fn membrane(&self) -> EdgeId {
        self.membrane
    }

    /// Additional diffusive resistance of the tank in series with its membrane. Zero for a
    /// perfectly mixed tank.
    pub fn resistance(&self) -> f64 {
        self.resistance
    }
}
