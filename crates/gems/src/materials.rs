pub const VISCOSITY_WATER: f64 = 1.0016e-3;

/// Cell culture medium at 37°C
pub const VISCOSITY_MEDIUM: f64 = 0.7e-3;

pub const DENSITY_MEDIUM: f64 = 993.;

/// Diffusion coefficient of a small molecule drug in water, e.g. Linsitinib
pub const DIFFUSIVITY_SMALL_MOLECULE: f64 = 4.4e-10;
