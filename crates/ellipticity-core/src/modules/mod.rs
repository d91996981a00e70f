pub mod coefficients;
pub mod correction;
pub mod integrate;
pub mod legs;
pub mod paths;
pub mod serialization;

pub use coefficients::{arrival_coefficients, batch_coefficients, ellipticity_coefficients};
pub use correction::{
    ArrivalCorrection, correct_arrivals, correction_from_coefficients, correction_from_latitude,
    latitude_to_colatitude,
};
pub use integrate::leg_contribution;
pub use legs::{Leg, LegBoundary, LegDirection, split_legs};
pub use paths::{
    RayPathError, RayPathPoint, RayPathRecord, infer_wave_types, load_ray_paths, write_ray_paths,
};
