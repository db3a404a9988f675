mod geometry;
mod lerp;
mod linear_solver;
mod materials;
mod runge_kutta;
mod units;

pub use geometry::*;
pub use lerp::*;
pub use linear_solver::*;
pub use materials::*;
pub use runge_kutta::*;
pub use units::*;
