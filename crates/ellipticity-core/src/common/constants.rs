//! Physical and geometric constants shared by the model, ray tracing and
//! coefficient code.

pub const PI: f64 = std::f64::consts::PI;
pub const PI2: f64 = 2.0 * PI;
pub const RADDEG: f64 = 180.0 / PI;
pub const TWO_THIRDS: f64 = 2.0 / 3.0;

/// Sidereal length of day of the Earth in seconds.
pub const EARTH_LOD: f64 = 86_164.0905_f64;
/// Universal gravitational constant in m^3 kg^-1 s^-2.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_08e-11_f64;
/// Mean Earth radius of the bundled reference models in km.
pub const EARTH_RADIUS_KM: f64 = 6_371.0_f64;

pub const KM_TO_M: f64 = 1.0e3;
/// g/cm^3 to kg/m^3.
pub const DENSITY_TO_SI: f64 = 1.0e3;

/// Depths closer than this (km) are treated as the same depth.
pub const DEPTH_TOLERANCE_KM: f64 = 1.0e-6;
