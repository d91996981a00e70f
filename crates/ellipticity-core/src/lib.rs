//! Ellipticity corrections for seismic travel times.
//!
//! Ray paths traced through a spherically symmetric model are combined with the
//! model's hydrostatic ellipticity of figure to give the coefficients
//! (σ0, σ1, σ2); a receiver azimuth and source latitude turn them into a
//! travel-time correction in seconds.

pub mod common;
pub mod domain;
pub mod model;
pub mod modules;
pub mod numerics;
pub mod raytrace;

pub use common::{EllipticityConfig, ModelSource};
pub use domain::{
    Arrival, ArrivalRequest, Coefficients, EllipError, EllipErrorCategory, EllipResult, RaySample,
    WaveType,
};
pub use model::VelocityModel;
pub use modules::{
    ArrivalCorrection, correct_arrivals, correction_from_coefficients, correction_from_latitude,
    ellipticity_coefficients,
};
pub use raytrace::{LayeredRayTracer, RayTracer};
