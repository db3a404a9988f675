pub fn disk_area(r: f64) -> f64 {
    r * r * core::f64::consts::PI
}

/// Rectangular box as used for channels, membranes and organ tanks on a chip.
///
/// The length runs along the flow direction, the width spans the contact face with neighboring
/// layers and the height is the extent perpendicular to that face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cuboid {
    pub height: f64,
    pub width: f64,
    pub length: f64,
}

impl Cuboid {
    pub fn new(height: f64, width: f64, length: f64) -> Self {
        Self {
            height,
            width,
            length,
        }
    }

    /// Area of the face spanned by width and length
    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    pub fn cross_section_area(&self) -> f64 {
        self.width * self.height
    }

    pub fn volume(&self) -> f64 {
        self.width * self.height * self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid() {
        let c = Cuboid::new(0.3e-3, 5e-3, 8e-3);
        approx::assert_relative_eq!(c.area(), 4e-5, max_relative = 1e-12);
        approx::assert_relative_eq!(c.cross_section_area(), 1.5e-6, max_relative = 1e-12);
        approx::assert_relative_eq!(c.volume(), 1.2e-8, max_relative = 1e-12);
    }

    #[test]
    fn test_disk_area() {
        approx::assert_relative_eq!(disk_area(2.0), 4.0 * core::f64::consts::PI);
    }
}
