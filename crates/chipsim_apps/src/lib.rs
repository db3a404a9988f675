mod organ_tank;

pub use organ_tank::*;
